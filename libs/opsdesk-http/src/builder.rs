use crate::client::{BufferedService, HttpClient};
use crate::config::{HttpClientConfig, TransportSecurity};
use crate::error::HttpError;
use crate::response::ResponseBody;
use crate::tls::build_https_connector;
use crate::user_agent::UserAgentLayer;
use bytes::Bytes;
use http::Response;
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::Client;
use hyper_util::rt::{TokioExecutor, TokioTimer};
use std::time::Duration;
use tower::buffer::Buffer;
use tower::timeout::TimeoutLayer;
use tower::{ServiceBuilder, ServiceExt};

/// Builder for [`HttpClient`].
#[derive(Debug, Clone, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: HttpClientConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    #[must_use]
    pub fn max_body_size(mut self, size: usize) -> Self {
        self.config.max_body_size = size;
        self
    }

    #[must_use]
    pub fn transport(mut self, transport: TransportSecurity) -> Self {
        self.config.transport = transport;
        self
    }

    /// Shorthand for `transport(TransportSecurity::AllowInsecureHttp)`.
    #[must_use]
    pub fn allow_insecure_http(self) -> Self {
        self.transport(TransportSecurity::AllowInsecureHttp)
    }

    #[must_use]
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    /// Build the client.
    ///
    /// Stack, outer to inner: `Buffer -> error mapping -> Timeout -> UserAgent -> hyper`.
    /// Must be called inside a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::Tls` if the connector cannot be built, or
    /// `HttpError::InvalidHeaderValue` for a bad user agent.
    pub fn build(self) -> Result<HttpClient, HttpError> {
        if self.config.transport == TransportSecurity::AllowInsecureHttp {
            tracing::warn!("plain HTTP allowed; use only for local backends and tests");
        }

        let timeout = self.config.request_timeout;
        let https = build_https_connector(self.config.transport)?;

        let mut client_builder = Client::builder(TokioExecutor::new());
        // pool_idle_timeout has no effect without a timer.
        client_builder
            .pool_timer(TokioTimer::new())
            .pool_max_idle_per_host(self.config.pool_max_idle_per_host);
        if let Some(idle) = self.config.pool_idle_timeout {
            client_builder.pool_idle_timeout(idle);
        }
        let hyper_client = client_builder.build::<_, Full<Bytes>>(https);

        let service = ServiceBuilder::new()
            .layer(TimeoutLayer::new(timeout))
            .layer(UserAgentLayer::try_new(&self.config.user_agent)?)
            .service(hyper_client)
            .map_response(box_response)
            .map_err(move |e: tower::BoxError| map_tower_error(e, timeout))
            .boxed_clone();

        let service: BufferedService = Buffer::new(service, self.config.buffer_capacity.max(1));

        Ok(HttpClient {
            service,
            max_body_size: self.config.max_body_size,
            transport_security: self.config.transport,
        })
    }
}

fn map_tower_error(err: tower::BoxError, timeout: Duration) -> HttpError {
    if err.is::<tower::timeout::error::Elapsed>() {
        return HttpError::Timeout(timeout);
    }
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(other) => HttpError::Transport(other),
    }
}

fn box_response<B>(response: Response<B>) -> Response<ResponseBody>
where
    B: hyper::body::Body<Data = Bytes> + Send + Sync + 'static,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let (parts, body) = response.into_parts();
    Response::from_parts(parts, body.map_err(Into::into).boxed())
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn setters_update_config() {
        let b = HttpClientBuilder::new()
            .timeout(Duration::from_secs(3))
            .user_agent("probe/1")
            .max_body_size(42)
            .buffer_capacity(2)
            .allow_insecure_http();
        assert_eq!(b.config.request_timeout, Duration::from_secs(3));
        assert_eq!(b.config.user_agent, "probe/1");
        assert_eq!(b.config.max_body_size, 42);
        assert_eq!(b.config.buffer_capacity, 2);
        assert_eq!(b.config.transport, TransportSecurity::AllowInsecureHttp);
    }

    #[tokio::test]
    async fn bad_user_agent_fails_build() {
        let result = HttpClientBuilder::new().user_agent("bad\r\nua").build();
        assert!(matches!(result, Err(HttpError::InvalidHeaderValue(_))));
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start();
        let _m = server.mock(|when, then| {
            when.method(GET).path("/slow");
            then.status(200).delay(Duration::from_millis(500));
        });

        let client = HttpClientBuilder::new()
            .allow_insecure_http()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap();

        let err = client
            .get(&format!("{}/slow", server.base_url()))
            .send()
            .await
            .unwrap_err();
        assert!(matches!(err, HttpError::Timeout(d) if d == Duration::from_millis(50)));
    }
}
