//! Headless list screens.
//!
//! A screen fetches its company-scoped collection, turns it into display rows
//! and refetches after every successful mutation or company switch. Each
//! screen owns a [`CancellationToken`]; once it is closed no response is
//! applied.

use std::future::Future;

use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use opsdesk_sdk::{ApiError, EMPTY_CELL};

mod profiles;
mod team;

pub use profiles::{ProfileRow, ProfilesScreen};
pub use team::{TeamRow, TeamScreen};

/// Load state of a screen's collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenState<T> {
    /// No company selected, nothing fetched.
    Idle,
    Loading,
    Ready(Vec<T>),
    Failed(String),
}

impl<T> ScreenState<T> {
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// Rows of the last successful fetch, empty otherwise.
    #[must_use]
    pub fn rows(&self) -> &[T] {
        match self {
            Self::Ready(rows) => rows,
            _ => &[],
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// Transient notification shown after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub severity: Severity,
    pub message: String,
}

impl Toast {
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Run `fut` unless `token` is cancelled first. `None` means cancelled.
pub(crate) async fn until_cancelled<F: Future>(
    token: &CancellationToken,
    fut: F,
) -> Option<F::Output> {
    tokio::select! {
        biased;
        () = token.cancelled() => None,
        out = fut => Some(out),
    }
}

/// Wait for the next company switch. `false` when the screen was closed
/// or the provider is gone.
async fn company_switched(
    token: &CancellationToken,
    changes: &mut watch::Receiver<Option<String>>,
) -> bool {
    matches!(until_cancelled(token, changes.changed()).await, Some(Ok(())))
}

/// Error text for a failed collection fetch.
fn fetch_error(err: &ApiError, resource: &str) -> String {
    match err {
        ApiError::NoResponse(_) => format!("Failed to fetch {resource} data"),
        other => other.to_string(),
    }
}

fn closed_error() -> ApiError {
    ApiError::NoResponse("screen closed".to_owned())
}

fn format_timestamp(value: Option<OffsetDateTime>) -> String {
    value
        .and_then(|ts| ts.format(&Rfc3339).ok())
        .unwrap_or_else(|| EMPTY_CELL.to_owned())
}
