#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Opsdesk console
//!
//! Headless implementation of the admin console screens:
//!
//! - [`RestConsoleClient`] - [`opsdesk_sdk::ConsoleApi`] over the authenticated gateway
//! - [`CompanyProvider`] / [`CompanyContext`] - the selected company
//! - [`TeamScreen`], [`ProfilesScreen`] - company-scoped tables
//! - [`AddMemberModal`], [`EditMemberModal`], [`AddProfileModal`] - forms
//!
//! Screens and modals take an `Arc<dyn ConsoleApi>`, so they run the same
//! against the REST client and in-memory fakes.

pub mod company;
pub mod config;
pub mod credential;
pub mod modals;
pub mod navigation;
pub mod rest;
pub mod screens;
pub mod table;
pub mod validation;

#[cfg(test)]
mod testing;

pub use company::{CompanyContext, CompanyProvider};
pub use config::ApiConfig;
pub use credential::{CredentialError, encode_credential_data};
pub use modals::{
    AddMemberModal, AddProfileModal, Closed, DeleteConfirmation, EditMemberModal, ModalState,
    SubmitError,
};
pub use navigation::{NAV_ITEMS, NavItem};
pub use rest::RestConsoleClient;
pub use screens::{ProfileRow, ProfilesScreen, ScreenState, Severity, TeamRow, TeamScreen, Toast};
pub use table::Table;
pub use validation::{Field, MemberForm, ProfileForm, ValidationErrors};
