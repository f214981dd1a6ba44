use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use opsdesk_http::{HttpClientConfig, TransportSecurity};

const DEFAULT_BASE_URL: &str = "http://localhost:8080/";

/// Backend API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiConfig {
    /// Base URL every API path is appended to, e.g. `https://api.example.com/v1`.
    #[serde(default = "default_base_url")]
    pub base_url: Url,

    #[serde(default = "default_timeout", with = "opsdesk_utils::duration_serde")]
    pub timeout: Duration,

    /// Permit plain `http://` backends. Off unless explicitly enabled.
    #[serde(default)]
    pub allow_insecure_http: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            allow_insecure_http: false,
        }
    }
}

impl ApiConfig {
    /// HTTP client settings for talking to the backend.
    #[must_use]
    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            request_timeout: self.timeout,
            transport: if self.allow_insecure_http {
                TransportSecurity::AllowInsecureHttp
            } else {
                TransportSecurity::TlsOnly
            },
            ..HttpClientConfig::default()
        }
    }
}

#[allow(clippy::expect_used)] // constant URL, it doesn't fail
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("valid default base URL")
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}
