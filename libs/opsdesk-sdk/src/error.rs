//! Error types for the console API.

use thiserror::Error;

/// Errors returned by [`ConsoleApi`](crate::ConsoleApi) operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request produced no usable response: no identity token, failed
    /// token refresh, or a transport failure.
    #[error("no response from backend: {0}")]
    NoResponse(String),

    /// The backend answered with a non-success status.
    ///
    /// `message` is the `message` field of the JSON error body when present,
    /// otherwise an operation-specific fallback.
    #[error("{message}")]
    Backend { status: u16, message: String },

    /// A success response whose body could not be decoded.
    #[error("invalid response body: {0}")]
    Decode(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Backend { status, .. } => Some(*status),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}
