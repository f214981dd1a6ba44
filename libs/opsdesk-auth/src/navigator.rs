use std::sync::Arc;

use parking_lot::Mutex;
use url::Url;

/// Where sign-in and sign-out redirects go.
///
/// A browser front end would change location; the CLI prints the URL.
pub trait Navigator: Send + Sync {
    fn navigate(&self, target: &Url);
}

/// Emits the target as a `tracing` event and nothing else.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn navigate(&self, target: &Url) {
        tracing::info!(target = %target, "navigation requested");
    }
}

/// Remembers every navigation. Clones share the same history.
#[derive(Debug, Clone, Default)]
pub struct RecordingNavigator {
    visits: Arc<Mutex<Vec<Url>>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn visits(&self) -> Vec<Url> {
        self.visits.lock().clone()
    }

    #[must_use]
    pub fn last(&self) -> Option<Url> {
        self.visits.lock().last().cloned()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, target: &Url) {
        self.visits.lock().push(target.clone());
    }
}
