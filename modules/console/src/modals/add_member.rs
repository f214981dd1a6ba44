use std::sync::Arc;

use opsdesk_sdk::{Access, AccessLevel, ConsoleApi};

use super::{ModalCore, SubmitError, fetch_levels};
use crate::company::CompanyContext;
use crate::validation::{MemberForm, validate_new_member};

/// Creates a user and adds it to the selected company's team.
pub struct AddMemberModal {
    api: Arc<dyn ConsoleApi>,
    company: CompanyContext,
    core: ModalCore,
    levels: Vec<AccessLevel>,
    form: MemberForm,
}

impl AddMemberModal {
    #[must_use]
    pub fn new(api: Arc<dyn ConsoleApi>, company: CompanyContext) -> Self {
        Self {
            api,
            company,
            core: ModalCore::default(),
            levels: Vec::new(),
            form: MemberForm::default(),
        }
    }

    modal_accessors!();

    /// Reset the form and fetch the role options.
    pub async fn open(&mut self) {
        self.core.opening();
        self.form = MemberForm::default();
        self.levels = fetch_levels(self.api.as_ref()).await;
        self.core.editing();
    }

    #[must_use]
    pub fn levels(&self) -> &[AccessLevel] {
        &self.levels
    }

    #[must_use]
    pub fn form(&self) -> &MemberForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut MemberForm {
        &mut self.form
    }

    /// Validate and submit. On success the modal closes and the created
    /// access is returned.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Invalid`] when a field is invalid; nothing is sent
    /// - [`SubmitError::Rejected`] when the backend refused the request
    /// - [`SubmitError::NotEditing`] / [`SubmitError::NoCompany`]
    pub async fn submit(&mut self) -> Result<Access, SubmitError> {
        self.core.ensure_editing()?;
        let payload = match validate_new_member(&self.form) {
            Ok(payload) => payload,
            Err(errors) => return Err(self.core.invalid(errors)),
        };
        let company_id = self.company.selected_id().ok_or(SubmitError::NoCompany)?;

        self.core.submitting();
        match self.api.add_member(&company_id, &payload).await {
            Ok(access) => {
                self.core.close();
                Ok(access)
            }
            Err(e) => Err(self.core.rejected(&e)),
        }
    }
}
