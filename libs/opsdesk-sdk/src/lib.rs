#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Opsdesk console SDK
//!
//! Transport-agnostic contract between the console screens and the backend:
//!
//! - [`ConsoleApi`] - the backend operations the console performs
//! - [`Access`], [`User`], [`Company`], [`Profile`] - records exchanged with the backend
//! - [`NewMember`], [`MemberUpdate`], [`NewProfile`] - request payloads
//! - [`ApiError`] - error type for every operation
//!
//! ```ignore
//! let team = api.list_team(company.id()).await?;
//! for access in &team {
//!     println!("{} {}", access.user.display_name(), access.level.label());
//! }
//! ```

pub mod api;
pub mod error;
pub mod models;

pub use api::ConsoleApi;
pub use error::ApiError;
pub use models::{
    Access, AccessLevel, AccessUser, Company, CredentialType, EMPTY_CELL, MemberUpdate,
    NewMember, NewProfile, ParseEnumError, Platform, Profile, User,
};
