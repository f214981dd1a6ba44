use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use opsdesk_sdk::{Access, ApiError, ConsoleApi};

use super::{ScreenState, Toast, closed_error, company_switched, fetch_error, until_cancelled};
use crate::company::CompanyContext;
use crate::modals::{AddMemberModal, Closed, DeleteConfirmation, EditMemberModal};

/// One row of the team table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamRow {
    pub id: String,
    pub name: String,
    pub role: String,
    pub email: String,
}

impl From<&Access> for TeamRow {
    fn from(access: &Access) -> Self {
        Self {
            id: access.id.clone(),
            name: access.user.display_name(),
            role: access.level.label(),
            email: access.user.email().to_owned(),
        }
    }
}

/// Team members of the selected company.
pub struct TeamScreen {
    api: Arc<dyn ConsoleApi>,
    company: CompanyContext,
    state: ScreenState<TeamRow>,
    members: Vec<Access>,
    toast: Option<Toast>,
    company_changes: watch::Receiver<Option<String>>,
    cancel: CancellationToken,
}

impl TeamScreen {
    #[must_use]
    pub fn new(api: Arc<dyn ConsoleApi>, company: CompanyContext) -> Self {
        Self {
            api,
            company_changes: company.changes(),
            company,
            state: ScreenState::Idle,
            members: Vec::new(),
            toast: None,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &ScreenState<TeamRow> {
        &self.state
    }

    #[must_use]
    pub fn rows(&self) -> &[TeamRow] {
        self.state.rows()
    }

    /// Accesses behind the current rows.
    #[must_use]
    pub fn members(&self) -> &[Access] {
        &self.members
    }

    #[must_use]
    pub fn member(&self, member_id: &str) -> Option<&Access> {
        self.members.iter().find(|m| m.id == member_id)
    }

    #[must_use]
    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

    /// Stop applying responses. Requests in flight are abandoned.
    pub fn close(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }

    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetch the team of the selected company.
    ///
    /// Does nothing without a selection. A response for a company that is no
    /// longer selected is dropped and the new company's team is fetched
    /// instead. Nothing is applied after [`close`](Self::close).
    pub async fn refresh(&mut self) {
        loop {
            self.company_changes.mark_unchanged();
            let Some(company_id) = self.company.selected_id() else {
                self.state = ScreenState::Idle;
                self.members.clear();
                return;
            };
            if self.is_closed() {
                return;
            }

            self.state = ScreenState::Loading;
            let Some(result) =
                until_cancelled(&self.cancel, self.api.list_team(&company_id)).await
            else {
                tracing::debug!(company_id, "team fetch cancelled");
                return;
            };
            if !self.company.is_current(&company_id) {
                tracing::debug!(company_id, "discarding team of a deselected company");
                continue;
            }

            match result {
                Ok(members) => {
                    tracing::debug!(company_id, count = members.len(), "team loaded");
                    self.state = ScreenState::Ready(members.iter().map(TeamRow::from).collect());
                    self.members = members;
                }
                Err(e) => {
                    self.state = ScreenState::Failed(fetch_error(&e, "team"));
                    self.members.clear();
                }
            }
            return;
        }
    }

    /// Wait for the selected company to change, then refetch.
    /// Returns `false` once the screen is closed.
    pub async fn follow_company(&mut self) -> bool {
        if !company_switched(&self.cancel, &mut self.company_changes).await {
            return false;
        }
        self.refresh().await;
        true
    }

    #[must_use]
    pub fn add_member_modal(&self) -> AddMemberModal {
        AddMemberModal::new(Arc::clone(&self.api), self.company.clone())
    }

    /// Modal for a listed member, `None` if the id is not on screen.
    #[must_use]
    pub fn edit_member_modal(&self, member_id: &str) -> Option<EditMemberModal> {
        let member = self.member(member_id)?.clone();
        Some(EditMemberModal::new(
            Arc::clone(&self.api),
            self.company.clone(),
            member,
        ))
    }

    pub async fn member_added(&mut self, outcome: Closed<Access>) {
        self.after_modal(outcome, "Member added").await;
    }

    pub async fn member_updated(&mut self, outcome: Closed<Access>) {
        self.after_modal(outcome, "Member updated").await;
    }

    async fn after_modal(&mut self, outcome: Closed<Access>, message: &str) {
        if outcome.submitted().is_some() {
            self.toast = Some(Toast::success(message));
            self.refresh().await;
        }
    }

    /// Ask before removing a listed member.
    #[must_use]
    pub fn request_delete(&self, member_id: &str) -> Option<DeleteConfirmation> {
        let company_id = self.company.selected_id()?;
        let member = self.member(member_id)?;
        Some(DeleteConfirmation::for_member(company_id, member))
    }

    /// Remove the confirmed member, then refetch the team once.
    ///
    /// # Errors
    /// Returns the backend error, which is also shown as a toast.
    pub async fn confirm_delete(&mut self, confirmation: DeleteConfirmation) -> Result<(), ApiError> {
        let removal = self
            .api
            .remove_member(confirmation.company_id(), confirmation.member_id());
        let result = until_cancelled(&self.cancel, removal)
            .await
            .unwrap_or_else(|| Err(closed_error()));

        match result {
            Ok(()) => {
                self.toast = Some(Toast::success("Member removed"));
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                if !self.is_closed() {
                    self.toast = Some(Toast::error(e.to_string()));
                }
                Err(e)
            }
        }
    }
}

impl Drop for TeamScreen {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
