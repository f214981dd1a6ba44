use std::time::Duration;

/// Default User-Agent string for HTTP requests
pub const DEFAULT_USER_AGENT: &str = concat!("opsdesk/", env!("CARGO_PKG_VERSION"));

/// Default cap on response bodies (10 MB).
const DEFAULT_MAX_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Which URL schemes the client accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportSecurity {
    /// Only `https://` URLs are accepted.
    #[default]
    TlsOnly,
    /// Plain `http://` is accepted as well. Meant for local backends and mock
    /// servers in tests.
    AllowInsecureHttp,
}

/// Configuration for [`HttpClient`](crate::HttpClient).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Timeout for a single request, connect included (default: 30s)
    pub request_timeout: Duration,

    /// Value of the `User-Agent` header when the caller did not set one
    pub user_agent: String,

    /// Maximum number of response body bytes read into memory (default: 10 MB)
    pub max_body_size: usize,

    /// URL scheme policy (default: HTTPS only)
    pub transport: TransportSecurity,

    /// Capacity of the request buffer in front of the connection pool
    pub buffer_capacity: usize,

    /// How long idle pooled connections are kept (`None` keeps them forever)
    pub pool_idle_timeout: Option<Duration>,

    /// Upper bound on idle connections kept per host
    pub pool_max_idle_per_host: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            transport: TransportSecurity::TlsOnly,
            buffer_capacity: 256,
            pool_idle_timeout: Some(Duration::from_secs(90)),
            pool_max_idle_per_host: 8,
        }
    }
}

impl HttpClientConfig {
    /// Settings for talking to an identity provider: short timeout, small
    /// bodies, HTTPS only.
    #[must_use]
    pub fn identity_provider() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            max_body_size: 1024 * 1024,
            buffer_capacity: 16,
            ..Self::default()
        }
    }

    /// Settings for tests against local mock servers.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            request_timeout: Duration::from_secs(5),
            transport: TransportSecurity::AllowInsecureHttp,
            ..Self::default()
        }
    }
}
