use crate::builder::HttpClientBuilder;
use crate::config::TransportSecurity;
use crate::error::HttpError;
use crate::request::RequestBuilder;
use crate::response::ResponseBody;
use bytes::Bytes;
use http::{Method, Request, Response};
use http_body_util::Full;
use std::future::Future;
use std::pin::Pin;
use tower::buffer::Buffer;

pub type ServiceFuture =
    Pin<Box<dyn Future<Output = Result<Response<ResponseBody>, HttpError>> + Send>>;

/// `Buffer<Req, F>` over the boxed tower stack.
pub type BufferedService = Buffer<Request<Full<Bytes>>, ServiceFuture>;

/// HTTP client over a buffered tower stack (timeout, user agent, hyper pool).
///
/// `HttpClient` is `Clone + Send + Sync` and cloning only clones a channel
/// handle, so store it by value. It must be built inside a tokio runtime
/// because the buffer spawns its worker task on construction.
#[derive(Clone)]
pub struct HttpClient {
    pub(crate) service: BufferedService,
    pub(crate) max_body_size: usize,
    pub(crate) transport_security: TransportSecurity,
}

impl HttpClient {
    /// Create a client with the default configuration.
    ///
    /// # Errors
    /// Returns an error if TLS initialization fails
    pub fn new() -> Result<Self, HttpError> {
        HttpClientBuilder::new().build()
    }

    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Start a request with an arbitrary method.
    ///
    /// `url` must be absolute. `http://` is only accepted when the client was
    /// built with [`TransportSecurity::AllowInsecureHttp`].
    pub fn request(&self, method: Method, url: &str) -> RequestBuilder {
        RequestBuilder::new(
            self.service.clone(),
            self.max_body_size,
            method,
            url.to_owned(),
            self.transport_security,
        )
    }

    pub fn get(&self, url: &str) -> RequestBuilder {
        self.request(Method::GET, url)
    }

    pub fn post(&self, url: &str) -> RequestBuilder {
        self.request(Method::POST, url)
    }

    pub fn put(&self, url: &str) -> RequestBuilder {
        self.request(Method::PUT, url)
    }

    pub fn patch(&self, url: &str) -> RequestBuilder {
        self.request(Method::PATCH, url)
    }

    pub fn delete(&self, url: &str) -> RequestBuilder {
        self.request(Method::DELETE, url)
    }
}

/// Unwrap the inner `HttpError` from a buffer error.
///
/// Anything else means the buffer worker is gone.
#[must_use]
pub fn map_buffer_error(err: tower::BoxError) -> HttpError {
    match err.downcast::<HttpError>() {
        Ok(http_err) => *http_err,
        Err(err) => {
            tracing::error!(error = %err, "request buffer closed unexpectedly");
            HttpError::ServiceClosed
        }
    }
}
