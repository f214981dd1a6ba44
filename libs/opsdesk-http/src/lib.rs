#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![warn(warnings)]

//! HTTP client used by the Opsdesk console to talk to the backend API and to
//! the identity provider.
//!
//! This crate provides a hyper-based HTTP client with:
//! - TLS via rustls (HTTPS only unless explicitly relaxed)
//! - Connection pooling
//! - Per-request timeouts
//! - User-Agent header injection
//!
//! Requests are never retried here. Retry policy belongs to the caller (the
//! authenticated gateway retries once after a 401, nothing else retries).
//!
//! # Example
//!
//! ```ignore
//! use opsdesk_http::HttpClient;
//! use std::time::Duration;
//!
//! let client = HttpClient::builder()
//!     .timeout(Duration::from_secs(10))
//!     .build()?;
//!
//! let levels: Vec<String> = client
//!     .get("https://api.example.com/access/level")
//!     .header("authorization", "Bearer token")
//!     .send()
//!     .await?
//!     .json()
//!     .await?;
//! ```

mod builder;
mod client;
mod config;
mod error;
mod request;
mod response;
mod tls;
mod user_agent;

pub use builder::HttpClientBuilder;
pub use client::HttpClient;
pub use config::{DEFAULT_USER_AGENT, HttpClientConfig, TransportSecurity};
pub use error::{HttpError, InvalidUriKind};
pub use request::RequestBuilder;
pub use response::{HttpResponse, ResponseBody};
pub use user_agent::{UserAgentLayer, UserAgentService};

/// Re-exported so callers can name methods and status codes without a direct
/// `http` dependency.
pub use http::{Method, StatusCode};
