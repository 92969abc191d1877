//! UI collaborator interface

use super::state::{SearchView, SessionState};
use crate::client::models::SearchResults;
use crate::error::ApiError;

/// Receives everything a search session wants shown.
///
/// Callbacks run while the session holds its state lock, which keeps them in
/// sequence order. They must not call back into the same session
/// synchronously; defer such calls (e.g. spawn a task) instead.
pub trait SearchObserver: Send + Sync {
    /// The visible view model changed
    fn view_changed(&self, view: &SearchView);

    /// A full search for `query` completed
    fn results_ready(&self, query: &str, results: &SearchResults) {
        let _ = (query, results);
    }

    fn state_changed(&self, state: &SessionState) {
        let _ = state;
    }

    /// The current request failed; the previous view stays on screen
    fn search_failed(&self, error: &ApiError) {
        let _ = error;
    }

    /// A response for an outdated sequence was dropped
    fn response_discarded(&self, sequence: u64) {
        let _ = sequence;
    }
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {
    fn view_changed(&self, _view: &SearchView) {}
}
