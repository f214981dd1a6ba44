//! Headless add/edit modals.
//!
//! Every modal follows the same lifecycle:
//!
//! ```text
//! Closed -> Opening -> Editing -> Submitting -> Closed (payload)
//!                      Editing -> Closed (cancelled)
//!                      Submitting -> Editing (error banner)
//! ```
//!
//! Invalid input never leaves `Editing` and never reaches the backend.

use opsdesk_sdk::{AccessLevel, ApiError, ConsoleApi};

use crate::validation::{Field, ValidationErrors};

/// Accessors every modal exposes over its [`ModalCore`].
macro_rules! modal_accessors {
    () => {
        #[must_use]
        pub fn state(&self) -> $crate::modals::ModalState {
            self.core.state
        }

        /// Error banner from the last rejected submission.
        #[must_use]
        pub fn banner(&self) -> Option<&str> {
            self.core.banner.as_deref()
        }

        /// Validation message shown under `field`.
        #[must_use]
        pub fn field_error(&self, field: $crate::validation::Field) -> Option<&str> {
            self.core.field_error(field)
        }

        /// Close without submitting. Returns `false` while a submission is in flight.
        pub fn cancel(&mut self) -> bool {
            self.core.cancel()
        }
    };
}

mod add_member;
mod add_profile;
mod delete_member;
mod edit_member;

pub use add_member::AddMemberModal;
pub use add_profile::AddProfileModal;
pub use delete_member::DeleteConfirmation;
pub use edit_member::EditMemberModal;

/// Banner text when the backend gave no usable message.
pub const UNEXPECTED_ERROR: &str = "An unexpected error occurred";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModalState {
    #[default]
    Closed,
    Opening,
    Editing,
    Submitting,
}

/// How a modal was closed, as reported to its screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Closed<T> {
    Submitted(T),
    Cancelled,
}

impl<T> Closed<T> {
    #[must_use]
    pub fn submitted(self) -> Option<T> {
        match self {
            Self::Submitted(value) => Some(value),
            Self::Cancelled => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SubmitError {
    #[error("the form is not open for editing")]
    NotEditing,
    #[error("no company selected")]
    NoCompany,
    #[error("{0}")]
    Invalid(ValidationErrors),
    /// The backend refused the request; the message is shown as a banner.
    #[error("{0}")]
    Rejected(String),
}

/// Lifecycle, banner and field errors shared by every modal.
#[derive(Debug, Default)]
struct ModalCore {
    state: ModalState,
    banner: Option<String>,
    field_errors: ValidationErrors,
}

impl ModalCore {
    fn opening(&mut self) {
        self.state = ModalState::Opening;
        self.banner = None;
        self.field_errors = ValidationErrors::default();
    }

    fn editing(&mut self) {
        self.state = ModalState::Editing;
    }

    fn ensure_editing(&self) -> Result<(), SubmitError> {
        if self.state == ModalState::Editing {
            Ok(())
        } else {
            Err(SubmitError::NotEditing)
        }
    }

    fn invalid(&mut self, errors: ValidationErrors) -> SubmitError {
        self.field_errors = errors.clone();
        SubmitError::Invalid(errors)
    }

    fn submitting(&mut self) {
        self.state = ModalState::Submitting;
        self.banner = None;
        self.field_errors = ValidationErrors::default();
    }

    fn rejected(&mut self, err: &ApiError) -> SubmitError {
        let message = banner_message(err);
        self.state = ModalState::Editing;
        self.banner = Some(message.clone());
        SubmitError::Rejected(message)
    }

    /// Keep the modal usable but show why its data is incomplete.
    fn load_failed(&mut self, err: &ApiError) {
        self.banner = Some(banner_message(err));
    }

    fn close(&mut self) {
        self.state = ModalState::Closed;
    }

    /// Close without a payload. A submission in flight cannot be cancelled.
    fn cancel(&mut self) -> bool {
        if self.state == ModalState::Submitting {
            return false;
        }
        self.state = ModalState::Closed;
        true
    }

    fn field_error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(field)
    }
}

fn banner_message(err: &ApiError) -> String {
    match err {
        ApiError::Backend { message, .. } => message.clone(),
        other => {
            tracing::warn!(error = %other, "modal request failed");
            UNEXPECTED_ERROR.to_owned()
        }
    }
}

/// Role options, fetched each time a member modal opens.
async fn fetch_levels(api: &dyn ConsoleApi) -> Vec<AccessLevel> {
    api.list_access_levels().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load access levels");
        Vec::new()
    })
}
