//! Selected company shared by every screen and modal.
//!
//! [`CompanyProvider`] owns the selection. Screens never see the provider;
//! they receive a [`CompanyContext`], and the only way to get one is
//! [`CompanyProvider::context`]. Selection changes are broadcast through a
//! `watch` channel so screens can refetch for the new company.

use std::sync::Arc;

use arc_swap::{ArcSwap, ArcSwapOption};
use tokio::sync::watch;

use opsdesk_sdk::{ApiError, Company, ConsoleApi};

struct Shared {
    companies: ArcSwap<Vec<Company>>,
    selected: ArcSwapOption<Company>,
    /// Id of the selected company, sent only when it changes.
    changes: watch::Sender<Option<String>>,
}

impl Default for Shared {
    fn default() -> Self {
        Self {
            companies: ArcSwap::default(),
            selected: ArcSwapOption::default(),
            changes: watch::Sender::new(None),
        }
    }
}

impl Shared {
    fn store_selected(&self, company: Option<Arc<Company>>) {
        let id = company.as_ref().map(|c| c.id.clone());
        self.selected.store(company);
        self.changes.send_if_modified(|current| {
            if *current == id {
                return false;
            }
            tracing::debug!(company_id = id.as_deref(), "selected company changed");
            *current = id;
            true
        });
    }
}

/// Owner of the company list and the current selection.
#[derive(Default)]
pub struct CompanyProvider {
    shared: Arc<Shared>,
}

impl CompanyProvider {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn context(&self) -> CompanyContext {
        CompanyContext {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Load the companies the user can access and select one.
    ///
    /// `preferred` wins when the user has access to it; otherwise the first
    /// company is selected. Returns the selected company.
    ///
    /// # Errors
    /// Returns the [`ApiError`] of `GET /access`; the selection is left as is.
    pub async fn load(
        &self,
        api: &dyn ConsoleApi,
        preferred: Option<&str>,
    ) -> Result<Option<Arc<Company>>, ApiError> {
        let accesses = api.list_accesses().await.inspect_err(|e| {
            tracing::error!(error = %e, "failed to fetch companies");
        })?;

        let companies: Vec<Company> = accesses.into_iter().filter_map(|a| a.company).collect();
        let selected = preferred
            .and_then(|id| companies.iter().find(|c| c.id == id))
            .or_else(|| companies.first())
            .cloned()
            .map(Arc::new);

        tracing::debug!(
            count = companies.len(),
            selected = selected.as_ref().map(|c| c.id.as_str()),
            "companies loaded"
        );
        self.shared.companies.store(Arc::new(companies));
        self.shared.store_selected(selected.clone());
        Ok(selected)
    }
}

/// Read access to the selected company, plus switching between loaded ones.
///
/// Cheap to clone; every clone observes the same selection.
#[derive(Clone)]
pub struct CompanyContext {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for CompanyContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompanyContext")
            .field("selected", &self.selected_id())
            .finish_non_exhaustive()
    }
}

impl CompanyContext {
    #[must_use]
    pub fn selected(&self) -> Option<Arc<Company>> {
        self.shared.selected.load_full()
    }

    #[must_use]
    pub fn selected_id(&self) -> Option<String> {
        self.shared.selected.load().as_ref().map(|c| c.id.clone())
    }

    #[must_use]
    pub fn companies(&self) -> Arc<Vec<Company>> {
        self.shared.companies.load_full()
    }

    /// Switch to a loaded company. Returns `false` if the id is unknown.
    #[must_use]
    pub fn select(&self, company_id: &str) -> bool {
        let companies = self.shared.companies.load();
        let Some(company) = companies.iter().find(|c| c.id == company_id) else {
            return false;
        };
        self.shared.store_selected(Some(Arc::new(company.clone())));
        true
    }

    /// Receiver that is notified whenever the selected company changes.
    /// The current selection counts as seen.
    #[must_use]
    pub fn changes(&self) -> watch::Receiver<Option<String>> {
        self.shared.changes.subscribe()
    }

    /// Whether `company_id` is still the selection. Responses fetched for a
    /// company that is no longer selected are discarded.
    #[must_use]
    pub fn is_current(&self, company_id: &str) -> bool {
        self.shared
            .selected
            .load()
            .as_ref()
            .is_some_and(|c| c.id == company_id)
    }
}
