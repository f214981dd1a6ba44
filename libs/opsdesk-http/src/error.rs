use std::time::Duration;

use thiserror::Error;

/// Classification of URL validation failures.
///
/// Match on this instead of the `reason` string, which is for logs only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidUriKind {
    /// URL could not be parsed
    ParseError,
    /// URL has no host
    MissingAuthority,
    /// URL has no scheme
    MissingScheme,
}

/// HTTP client error types
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum HttpError {
    /// Request building failed
    #[error("Failed to build request: {0}")]
    RequestBuild(#[from] http::Error),

    /// Invalid header name
    #[error("Invalid header name: {0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),

    /// Invalid header value
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),

    /// Request timed out
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// Transport error (network, connection, etc)
    #[error("Transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// TLS setup error
    #[error("TLS error: {0}")]
    Tls(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Response body exceeded size limit
    #[error("Response body too large: limit {limit} bytes, got {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Non-2xx status surfaced by [`HttpResponse::error_for_status`](crate::HttpResponse::error_for_status)
    /// or one of the checked body readers
    #[error("HTTP {status}: {body_preview}")]
    HttpStatus {
        status: http::StatusCode,
        body_preview: String,
        content_type: Option<String>,
    },

    /// JSON (de)serialization error
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Form URL encoding error
    #[error("Form encoding failed: {0}")]
    FormEncode(#[from] serde_urlencoded::ser::Error),

    /// The request buffer worker is gone
    #[error("Service unavailable: internal failure")]
    ServiceClosed,

    /// Invalid URL
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUri {
        url: String,
        kind: InvalidUriKind,
        reason: String,
    },

    /// URL scheme rejected by the transport security policy
    #[error("URL scheme '{scheme}' not allowed: {reason}")]
    InvalidScheme { scheme: String, reason: String },
}

impl From<hyper::Error> for HttpError {
    fn from(err: hyper::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

impl From<hyper_util::client::legacy::Error> for HttpError {
    fn from(err: hyper_util::client::legacy::Error) -> Self {
        HttpError::Transport(Box::new(err))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use std::error::Error;
    use std::fmt;

    #[derive(Debug)]
    struct Refused;

    impl fmt::Display for Refused {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("connection refused")
        }
    }

    impl Error for Refused {}

    #[test]
    fn transport_error_keeps_source() {
        let err = HttpError::Transport(Box::new(Refused));
        let source = err.source().expect("transport error should have a source");
        assert!(source.downcast_ref::<Refused>().is_some());
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn status_error_renders_status_and_preview() {
        let err = HttpError::HttpStatus {
            status: http::StatusCode::FORBIDDEN,
            body_preview: r#"{"message":"nope"}"#.to_owned(),
            content_type: None,
        };
        assert_eq!(err.to_string(), r#"HTTP 403 Forbidden: {"message":"nope"}"#);
    }
}
