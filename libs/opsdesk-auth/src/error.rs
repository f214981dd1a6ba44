use thiserror::Error;

/// Errors from the identity session.
///
/// No variant ever carries a token, a refresh token or a PKCE verifier.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    /// Interactive sign-in is needed (no refresh token, or the provider
    /// rejected it).
    #[error("login required")]
    LoginRequired,

    /// A callback arrived but no sign-in was started.
    #[error("no sign-in in progress")]
    NoPendingLogin,

    /// The callback `state` does not match the pending sign-in.
    #[error("sign-in state mismatch")]
    StateMismatch,

    /// The provider answered with an OAuth error code.
    #[error("identity provider error: {error}{}", parenthesized(.description.as_deref()))]
    Provider {
        error: String,
        description: Option<String>,
    },

    /// Transport or status failure talking to the provider.
    ///
    /// Produced by [`format_http_error`](crate::http_error::format_http_error).
    #[error("{0}")]
    Http(String),

    /// Unparseable or incomplete discovery/token response.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),

    /// The redirect URL handed to `complete_signin` is malformed.
    #[error("invalid callback URL: {0}")]
    InvalidCallback(String),

    #[error("OIDC config error: {0}")]
    Config(String),

    /// Reading or writing the persisted session failed.
    #[error("session storage error: {0}")]
    Storage(String),
}

fn parenthesized(detail: Option<&str>) -> String {
    match detail {
        Some(d) => format!(" ({d})"),
        None => String::new(),
    }
}

/// Why the gateway produced no usable response.
///
/// Every variant means "no response" to a caller that only needs the
/// yes/no answer; use `send().await.ok()` for that.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GatewayError {
    /// No identity token could be obtained; sign-out was triggered and no
    /// request was sent.
    #[error("no valid identity token; signed out")]
    SignedOut,

    /// The silent refresh after a 401 failed. No sign-out is triggered.
    #[error("silent token refresh failed: {0}")]
    Refresh(#[source] SessionError),

    /// The request could not be sent or timed out.
    #[error("request failed: {0}")]
    Transport(#[from] opsdesk_http::HttpError),

    /// The JSON body could not be serialized.
    #[error("failed to encode request body: {0}")]
    Encode(#[from] serde_json::Error),
}

impl GatewayError {
    /// The session had no usable token; nothing was sent.
    #[must_use]
    pub fn is_signed_out(&self) -> bool {
        matches!(self, Self::SignedOut)
    }
}
