//! Search session state and view model

use serde::Serialize;
use tokio::time::Instant;

use crate::history::HistoryEntry;

/// What a sequence number was issued for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestKind {
    /// Debounced type-ahead lookup
    Suggestions,
    /// Explicit user search
    Search,
}

/// Session lifecycle.
///
/// A response that arrives for an older sequence is dropped without a state
/// change: the newer request it lost to is still the one in flight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Debouncing,
    Requesting { sequence: u64, kind: RequestKind },
    Resolved { sequence: u64, kind: RequestKind },
    Failed { sequence: u64, kind: RequestKind },
}

/// One issued request, consumed once its response arrives
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    pub sequence: u64,
    pub kind: RequestKind,
    pub issued_at: Instant,
}

/// Spelling fix offered by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuggestionCorrection {
    pub original: String,
    pub corrected: String,
}

/// Everything the UI renders for the search box
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchView {
    /// Query the view was produced for
    pub query: String,
    pub suggestions: Vec<String>,
    /// Recent searches; only populated while the query is short
    pub history: Vec<HistoryEntry>,
    /// Trending searches; only populated while the query is short
    pub trending: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub correction: Option<SuggestionCorrection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<String>,
}

/// Per-session counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub issued: u64,
    pub resolved: u64,
    pub failed: u64,
    pub discarded: u64,
}
