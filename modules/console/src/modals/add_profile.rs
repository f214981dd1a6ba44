use std::sync::Arc;

use opsdesk_sdk::{ConsoleApi, Platform, Profile};

use super::{ModalCore, SubmitError};
use crate::company::CompanyContext;
use crate::validation::{ProfileForm, validate_new_profile};

/// Creates a cloud provider profile for the selected company.
pub struct AddProfileModal {
    api: Arc<dyn ConsoleApi>,
    company: CompanyContext,
    core: ModalCore,
    form: ProfileForm,
}

impl AddProfileModal {
    #[must_use]
    pub fn new(api: Arc<dyn ConsoleApi>, company: CompanyContext) -> Self {
        Self {
            api,
            company,
            core: ModalCore::default(),
            form: ProfileForm::default(),
        }
    }

    modal_accessors!();

    /// Reset the form. Nothing needs fetching.
    pub fn open(&mut self) {
        self.core.opening();
        self.form = ProfileForm::default();
        self.core.editing();
    }

    /// Platforms offered in the platform selector.
    #[must_use]
    pub fn platforms() -> &'static [Platform] {
        Platform::selectable()
    }

    #[must_use]
    pub fn form(&self) -> &ProfileForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ProfileForm {
        &mut self.form
    }

    /// Validate, encode the credential data and submit. On success the modal
    /// closes; the created profile is returned when the backend sends it.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Invalid`] when a field is invalid or the credential
    ///   data is not JSON; nothing is sent
    /// - [`SubmitError::Rejected`] when the backend refused the request
    /// - [`SubmitError::NotEditing`] / [`SubmitError::NoCompany`]
    pub async fn submit(&mut self) -> Result<Option<Profile>, SubmitError> {
        self.core.ensure_editing()?;
        let payload = match validate_new_profile(&self.form) {
            Ok(payload) => payload,
            Err(errors) => return Err(self.core.invalid(errors)),
        };
        let company_id = self.company.selected_id().ok_or(SubmitError::NoCompany)?;

        self.core.submitting();
        match self.api.create_profile(&company_id, &payload).await {
            Ok(created) => {
                self.core.close();
                Ok(created)
            }
            Err(e) => Err(self.core.rejected(&e)),
        }
    }
}
