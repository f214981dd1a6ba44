use crate::client::{BufferedService, map_buffer_error};
use crate::config::TransportSecurity;
use crate::error::{HttpError, InvalidUriKind};
use crate::response::{HttpResponse, ResponseBody};
use bytes::Bytes;
use http::header::{HeaderName, HeaderValue};
use http::{Request, Response};
use http_body_util::Full;
use serde::Serialize;
use tower::{Service, ServiceExt};

#[derive(Clone, Debug)]
enum Body {
    Empty,
    Raw(Bytes),
    Json(Bytes),
    Form(Bytes),
}

/// Fluent request builder returned by [`HttpClient::get`](crate::HttpClient::get) and friends.
///
/// Header and body errors are deferred and surface from [`send()`](Self::send)
/// (or from [`json()`](Self::json) / [`form()`](Self::form), which are fallible).
///
/// ```ignore
/// let resp = client
///     .patch("https://api.example.com/company/c1/team/m1")
///     .header("authorization", "Bearer token")
///     .json(&update)?
///     .send()
///     .await?;
/// ```
#[must_use = "RequestBuilder does nothing until .send() is called"]
pub struct RequestBuilder {
    service: BufferedService,
    max_body_size: usize,
    method: http::Method,
    url: String,
    headers: Vec<(HeaderName, HeaderValue)>,
    body: Body,
    error: Option<HttpError>,
    transport_security: TransportSecurity,
}

impl RequestBuilder {
    pub(crate) fn new(
        service: BufferedService,
        max_body_size: usize,
        method: http::Method,
        url: String,
        transport_security: TransportSecurity,
    ) -> Self {
        Self {
            service,
            max_body_size,
            method,
            url,
            headers: Vec::new(),
            body: Body::Empty,
            error: None,
            transport_security,
        }
    }

    /// Add a single header. Invalid names or values are reported by `send()`.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        if self.error.is_some() {
            return self;
        }
        match (HeaderName::try_from(name), HeaderValue::try_from(value)) {
            (Ok(name), Ok(value)) => self.headers.push((name, value)),
            (Err(e), _) => self.error = Some(HttpError::InvalidHeaderName(e)),
            (_, Err(e)) => self.error = Some(HttpError::InvalidHeaderValue(e)),
        }
        self
    }

    /// Add several headers in order.
    pub fn headers<I, K, V>(self, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        headers
            .into_iter()
            .fold(self, |req, (k, v)| req.header(k.as_ref(), v.as_ref()))
    }

    /// Serialize `body` as JSON. Sets `content-type: application/json` unless
    /// the caller supplied a content type.
    ///
    /// # Errors
    ///
    /// Returns a deferred header error, or `HttpError::Json` if serialization fails.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.body = Body::Json(Bytes::from(serde_json::to_vec(body)?));
        Ok(self)
    }

    /// URL-encode `fields` as the body. Sets
    /// `content-type: application/x-www-form-urlencoded` unless already set.
    ///
    /// # Errors
    ///
    /// Returns a deferred header error, or `HttpError::FormEncode` if encoding fails.
    pub fn form(mut self, fields: &[(&str, &str)]) -> Result<Self, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.body = Body::Form(Bytes::from(serde_urlencoded::to_string(fields)?));
        Ok(self)
    }

    /// Use pre-encoded bytes as the body. No content type is added.
    pub fn body_bytes(mut self, body: Bytes) -> Self {
        self.body = Body::Raw(body);
        self
    }

    fn validate_url(&self) -> Result<http::Uri, HttpError> {
        let uri: http::Uri =
            self.url
                .parse()
                .map_err(|e: http::uri::InvalidUri| HttpError::InvalidUri {
                    url: self.url.clone(),
                    kind: InvalidUriKind::ParseError,
                    reason: e.to_string(),
                })?;

        if uri.authority().is_none() {
            return Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingAuthority,
                reason: "missing host".to_owned(),
            });
        }

        match (uri.scheme_str(), self.transport_security) {
            (Some("https"), _) | (Some("http"), TransportSecurity::AllowInsecureHttp) => Ok(uri),
            (Some("http"), TransportSecurity::TlsOnly) => Err(HttpError::InvalidScheme {
                scheme: "http".to_owned(),
                reason: "HTTPS required".to_owned(),
            }),
            (Some(scheme), _) => Err(HttpError::InvalidScheme {
                scheme: scheme.to_owned(),
                reason: "only http:// and https:// are supported".to_owned(),
            }),
            (None, _) => Err(HttpError::InvalidUri {
                url: self.url.clone(),
                kind: InvalidUriKind::MissingScheme,
                reason: "missing scheme".to_owned(),
            }),
        }
    }

    /// Send the request.
    ///
    /// Resolves to `Ok` for every HTTP status. Only transport-level failures
    /// (connect, TLS, timeout) and builder errors are returned as `Err`.
    ///
    /// # Errors
    ///
    /// Returns `HttpError` on invalid URL, deferred header error, timeout or transport failure.
    pub async fn send(mut self) -> Result<HttpResponse, HttpError> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        let uri = self.validate_url()?;
        let mut builder = Request::builder().method(self.method).uri(uri);

        let has_content_type = self
            .headers
            .iter()
            .any(|(name, _)| name == http::header::CONTENT_TYPE);
        if !has_content_type {
            match &self.body {
                Body::Json(_) => {
                    builder = builder.header(http::header::CONTENT_TYPE, "application/json");
                }
                Body::Form(_) => {
                    builder = builder.header(
                        http::header::CONTENT_TYPE,
                        "application/x-www-form-urlencoded",
                    );
                }
                Body::Empty | Body::Raw(_) => {}
            }
        }

        for (name, value) in self.headers {
            builder = builder.header(name, value);
        }

        let body = match self.body {
            Body::Empty => Bytes::new(),
            Body::Raw(b) | Body::Json(b) | Body::Form(b) => b,
        };
        let request = builder.body(Full::new(body))?;

        let service = self.service.ready().await.map_err(map_buffer_error)?;
        let inner: Response<ResponseBody> = service.call(request).await.map_err(map_buffer_error)?;

        Ok(HttpResponse {
            inner,
            max_body_size: self.max_body_size,
        })
    }
}
