use crate::error::HttpError;
use bytes::Bytes;
use http::{HeaderMap, Response, StatusCode};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;

/// Cap on how much of a non-2xx body is read into [`HttpError::HttpStatus`] (8 KB).
pub const ERROR_BODY_PREVIEW_LIMIT: usize = 8 * 1024;

/// Type-erased response body.
pub type ResponseBody =
    http_body_util::combinators::BoxBody<Bytes, Box<dyn std::error::Error + Send + Sync>>;

/// HTTP response wrapper with body-reading helpers
///
/// `send()` resolves to this for every status, 4xx and 5xx included. Callers
/// that care about the status inspect [`status()`](Self::status) or use the
/// checked readers:
/// - `resp.error_for_status()?` - check status without reading the body
/// - `resp.bytes().await?` - read raw bytes, any status
/// - `resp.checked_bytes().await?` - read bytes, non-2xx becomes an error
/// - `resp.json::<T>().await?` - parse JSON, non-2xx becomes an error
///
/// All body reads enforce the configured `max_body_size` limit.
#[derive(Debug)]
pub struct HttpResponse {
    pub(crate) inner: Response<ResponseBody>,
    pub(crate) max_body_size: usize,
}

impl HttpResponse {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.inner.status()
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        self.inner.headers()
    }

    /// Check status and return error for non-2xx responses
    ///
    /// Does NOT read the response body, so the preview in the error is empty.
    ///
    /// # Errors
    ///
    /// Returns `HttpError::HttpStatus` if the response status is not 2xx.
    pub fn error_for_status(self) -> Result<Self, HttpError> {
        if self.inner.status().is_success() {
            return Ok(self);
        }

        Err(HttpError::HttpStatus {
            status: self.inner.status(),
            body_preview: String::new(),
            content_type: content_type(self.inner.headers()),
        })
    }

    /// Read response body as bytes without status check
    ///
    /// # Errors
    /// Returns `HttpError::BodyTooLarge` if body exceeds limit.
    pub async fn bytes(self) -> Result<Bytes, HttpError> {
        read_limited(self.inner, self.max_body_size).await
    }

    /// Read response body as bytes with status check
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` if status is not 2xx.
    /// Returns `HttpError::BodyTooLarge` if body exceeds limit.
    pub async fn checked_bytes(self) -> Result<Bytes, HttpError> {
        read_checked(self.inner, self.max_body_size).await
    }

    /// Parse response body as JSON with status check
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` if status is not 2xx.
    /// Returns `HttpError::BodyTooLarge` if body exceeds limit.
    /// Returns `HttpError::Json` if parsing fails.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T, HttpError> {
        let body = read_checked(self.inner, self.max_body_size).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Read response body as UTF-8 text with status check
    ///
    /// Invalid UTF-8 sequences are replaced with U+FFFD.
    ///
    /// # Errors
    /// Returns `HttpError::HttpStatus` if status is not 2xx.
    /// Returns `HttpError::BodyTooLarge` if body exceeds limit.
    pub async fn text(self) -> Result<String, HttpError> {
        let body = read_checked(self.inner, self.max_body_size).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }
}

fn content_type(headers: &HeaderMap) -> Option<String> {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(String::from)
}

async fn read_checked(
    response: Response<ResponseBody>,
    max_body_size: usize,
) -> Result<Bytes, HttpError> {
    let status = response.status();
    if status.is_success() {
        return read_limited(response, max_body_size).await;
    }

    let content_type = content_type(response.headers());
    // A body that is too large must not hide the status error.
    let body_preview =
        match read_limited(response, max_body_size.min(ERROR_BODY_PREVIEW_LIMIT)).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(HttpError::BodyTooLarge { .. }) => "<body too large for preview>".to_owned(),
            Err(e) => return Err(e),
        };

    Err(HttpError::HttpStatus {
        status,
        body_preview,
        content_type,
    })
}

async fn read_limited(response: Response<ResponseBody>, limit: usize) -> Result<Bytes, HttpError> {
    let mut body = std::pin::pin!(response.into_body());
    let mut collected = Vec::new();

    while let Some(frame) = body.frame().await {
        let frame = frame.map_err(HttpError::Transport)?;
        if let Some(chunk) = frame.data_ref() {
            let actual = collected.len() + chunk.len();
            if actual > limit {
                return Err(HttpError::BodyTooLarge { limit, actual });
            }
            collected.extend_from_slice(chunk);
        }
    }

    Ok(Bytes::from(collected))
}
