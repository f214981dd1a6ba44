/// Render an [`opsdesk_http::HttpError`] with a context prefix such as
/// `"OIDC discovery"` or `"OIDC token"`.
///
/// Status errors carry only the status code. Response bodies from the
/// identity provider are left out of the message.
#[must_use]
pub fn format_http_error(e: &opsdesk_http::HttpError, prefix: &str) -> String {
    use opsdesk_http::HttpError;

    match e {
        HttpError::HttpStatus { status, .. } => format!("{prefix} HTTP {status}"),
        HttpError::Json(err) => format!("{prefix} JSON parse failed: {err}"),
        HttpError::Timeout(duration) => format!("{prefix} request timed out after {duration:?}"),
        HttpError::Transport(err) => format!("{prefix} transport error: {err}"),
        HttpError::BodyTooLarge { limit, actual } => {
            format!("{prefix} response too large: limit {limit} bytes, got {actual} bytes")
        }
        HttpError::Tls(err) => format!("{prefix} TLS error: {err}"),
        HttpError::RequestBuild(err) => format!("{prefix} request build failed: {err}"),
        HttpError::InvalidHeaderName(err) => format!("{prefix} invalid header name: {err}"),
        HttpError::InvalidHeaderValue(err) => format!("{prefix} invalid header value: {err}"),
        HttpError::FormEncode(err) => format!("{prefix} form encode error: {err}"),
        HttpError::ServiceClosed => format!("{prefix} service unavailable"),
        HttpError::InvalidUri { url, reason, .. } => {
            format!("{prefix} invalid URL '{url}': {reason}")
        }
        HttpError::InvalidScheme { scheme, reason } => {
            format!("{prefix} invalid scheme '{scheme}': {reason}")
        }
        _ => format!("{prefix} request failed"),
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use opsdesk_http::HttpError;
    use std::time::Duration;

    #[test]
    fn status_error_omits_body() {
        let err = HttpError::HttpStatus {
            status: http::StatusCode::BAD_REQUEST,
            body_preview: r#"{"error":"invalid_grant","refresh_token":"leak"}"#.into(),
            content_type: None,
        };
        let msg = format_http_error(&err, "OIDC token");
        assert_eq!(msg, "OIDC token HTTP 400 Bad Request");
        assert!(!msg.contains("leak"));
    }

    #[test]
    fn timeout_includes_duration() {
        let msg = format_http_error(&HttpError::Timeout(Duration::from_secs(10)), "OIDC discovery");
        assert_eq!(msg, "OIDC discovery request timed out after 10s");
    }
}
