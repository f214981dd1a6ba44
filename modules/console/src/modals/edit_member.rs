use std::sync::Arc;

use opsdesk_sdk::{Access, AccessLevel, AccessUser, ConsoleApi};

use super::{ModalCore, SubmitError, fetch_levels};
use crate::company::CompanyContext;
use crate::validation::{MemberForm, validate_member_update};

/// Edits name and role of an existing team member. The email is shown but
/// cannot be changed.
pub struct EditMemberModal {
    api: Arc<dyn ConsoleApi>,
    company: CompanyContext,
    core: ModalCore,
    levels: Vec<AccessLevel>,
    member: Access,
    form: MemberForm,
}

impl EditMemberModal {
    #[must_use]
    pub fn new(api: Arc<dyn ConsoleApi>, company: CompanyContext, member: Access) -> Self {
        let form = prefill(&member);
        Self {
            api,
            company,
            core: ModalCore::default(),
            levels: Vec::new(),
            member,
            form,
        }
    }

    modal_accessors!();

    /// Fetch role options and, when only the user id is known, the member
    /// details used to prefill the form.
    pub async fn open(&mut self) {
        self.core.opening();

        if let (AccessUser::Reference(_), Some(company_id)) =
            (&self.member.user, self.company.selected_id())
        {
            match self.api.get_member(&company_id, &self.member.id).await {
                Ok(member) => self.member = member,
                Err(e) => {
                    tracing::warn!(member_id = %self.member.id, error = %e, "failed to load member details");
                    self.core.load_failed(&e);
                }
            }
        }
        self.form = prefill(&self.member);
        self.levels = fetch_levels(self.api.as_ref()).await;
        self.core.editing();
    }

    #[must_use]
    pub fn member(&self) -> &Access {
        &self.member
    }

    #[must_use]
    pub fn levels(&self) -> &[AccessLevel] {
        &self.levels
    }

    /// The member's email, read-only.
    #[must_use]
    pub fn email(&self) -> &str {
        self.member.user.as_user().map_or("", |u| u.email.as_str())
    }

    #[must_use]
    pub fn form(&self) -> &MemberForm {
        &self.form
    }

    /// Editable fields. Changes to `email` and `password` are ignored.
    pub fn form_mut(&mut self) -> &mut MemberForm {
        &mut self.form
    }

    /// Validate and submit. On success the modal closes and the updated
    /// access is returned.
    ///
    /// # Errors
    ///
    /// - [`SubmitError::Invalid`] when a field is invalid; nothing is sent
    /// - [`SubmitError::Rejected`] when the backend refused the request
    /// - [`SubmitError::NotEditing`] / [`SubmitError::NoCompany`]
    pub async fn submit(&mut self) -> Result<Access, SubmitError> {
        self.core.ensure_editing()?;
        let form = MemberForm {
            email: self.email().to_owned(),
            ..self.form.clone()
        };
        let payload = match validate_member_update(&form) {
            Ok(payload) => payload,
            Err(errors) => return Err(self.core.invalid(errors)),
        };
        let company_id = self.company.selected_id().ok_or(SubmitError::NoCompany)?;

        self.core.submitting();
        match self
            .api
            .update_member(&company_id, &self.member.id, &payload)
            .await
        {
            Ok(updated) => {
                self.core.close();
                self.member = updated.clone();
                Ok(updated)
            }
            Err(e) => Err(self.core.rejected(&e)),
        }
    }
}

fn prefill(member: &Access) -> MemberForm {
    let mut form = MemberForm {
        level: member.level.as_str().to_owned(),
        ..MemberForm::default()
    };
    if let Some(user) = member.user.as_user() {
        form.first_name.clone_from(&user.first_name);
        form.last_name.clone_from(&user.last_name);
        form.email.clone_from(&user.email);
    }
    form
}
