use std::sync::Arc;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use opsdesk_sdk::{ConsoleApi, EMPTY_CELL, Profile};

use super::{
    ScreenState, Toast, company_switched, fetch_error, format_timestamp, until_cancelled,
};
use crate::company::CompanyContext;
use crate::modals::{AddProfileModal, Closed};

/// One row of the profiles table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileRow {
    pub id: String,
    pub name: String,
    pub platform: String,
    pub credential_type: String,
    pub description: String,
    pub created_by: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Profile> for ProfileRow {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            platform: profile.platform.display_name().to_owned(),
            credential_type: profile.credential_type.display_name().to_owned(),
            description: profile
                .description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| EMPTY_CELL.to_owned()),
            created_by: profile.created_by_name(),
            created_at: format_timestamp(profile.created_at),
            updated_at: format_timestamp(profile.updated_at),
        }
    }
}

/// Cloud provider profiles of the selected company.
pub struct ProfilesScreen {
    api: Arc<dyn ConsoleApi>,
    company: CompanyContext,
    state: ScreenState<ProfileRow>,
    toast: Option<Toast>,
    company_changes: watch::Receiver<Option<String>>,
    cancel: CancellationToken,
}

impl ProfilesScreen {
    #[must_use]
    pub fn new(api: Arc<dyn ConsoleApi>, company: CompanyContext) -> Self {
        Self {
            api,
            company_changes: company.changes(),
            company,
            state: ScreenState::Idle,
            toast: None,
            cancel: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn state(&self) -> &ScreenState<ProfileRow> {
        &self.state
    }

    #[must_use]
    pub fn rows(&self) -> &[ProfileRow] {
        self.state.rows()
    }

    #[must_use]
    pub fn toast(&self) -> Option<&Toast> {
        self.toast.as_ref()
    }

    pub fn dismiss_toast(&mut self) {
        self.toast = None;
    }

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

    /// Fetch the profiles of the selected company. A stale response is
    /// replaced by a fetch for the new selection; post-close responses are
    /// dropped.
    pub async fn refresh(&mut self) {
        loop {
            self.company_changes.mark_unchanged();
            let Some(company_id) = self.company.selected_id() else {
                self.state = ScreenState::Idle;
                return;
            };
            if self.is_closed() {
                return;
            }

            self.state = ScreenState::Loading;
            let Some(result) =
                until_cancelled(&self.cancel, self.api.list_profiles(&company_id)).await
            else {
                tracing::debug!(company_id, "profiles fetch cancelled");
                return;
            };
            if !self.company.is_current(&company_id) {
                tracing::debug!(company_id, "discarding profiles of a deselected company");
                continue;
            }

            self.state = match result {
                Ok(profiles) => {
                    tracing::debug!(company_id, count = profiles.len(), "profiles loaded");
                    ScreenState::Ready(profiles.iter().map(ProfileRow::from).collect())
                }
                Err(e) => ScreenState::Failed(fetch_error(&e, "profiles")),
            };
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
    pub fn add_profile_modal(&self) -> AddProfileModal {
        AddProfileModal::new(Arc::clone(&self.api), self.company.clone())
    }

    pub async fn profile_created(&mut self, outcome: Closed<Option<Profile>>) {
        if outcome.submitted().is_some() {
            self.toast = Some(Toast::success("Profile created"));
            self.refresh().await;
        }
    }
}

impl Drop for ProfilesScreen {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
