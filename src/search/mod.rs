//! Debounced, race-safe search sessions
//!
//! A [`SearchSession`] drives one search box. Keystrokes are debounced into
//! suggestion lookups; explicit actions (enter, picking a suggestion, a
//! history or trending entry, a voice transcript) search immediately. Every
//! request gets the next sequence number of the session, and only the
//! response carrying the latest issued sequence may change what is shown.
//! Responses arriving out of order are dropped, never applied.

mod observer;
mod state;

pub use observer::{NoopObserver, SearchObserver};
pub use state::{
    RequestKind, SearchQuery, SearchView, SessionState, SessionStats, SuggestionCorrection,
};

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use tokio::time::Instant;

use crate::catalog::{Catalog, MIN_QUERY_LEN};
use crate::client::models::{QueryInfo, SearchResults, SuggestionResponse};
use crate::debounce::Debouncer;
use crate::error::ApiError;
use crate::history::LocalHistoryStore;

/// Quiet period before a suggestion lookup is sent
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Session behaviour settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    pub debounce: Duration,
    /// Shorter (trimmed) input shows history and trending instead of suggestions
    pub min_query_len: usize,
    /// Language code sent with every lookup
    pub language: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            min_query_len: MIN_QUERY_LEN,
            language: "en".to_string(),
        }
    }
}

struct SessionData {
    state: SessionState,
    input: String,
    /// Bumped on every input change and explicit action so that a debounce
    /// callback armed for older input never fires a lookup
    input_epoch: u64,
    last_issued: u64,
    in_flight: Option<SearchQuery>,
    view: SearchView,
    trending: Vec<String>,
    stats: SessionStats,
    closed: bool,
}

struct SessionInner {
    catalog: Catalog,
    history: Arc<LocalHistoryStore>,
    observer: Arc<dyn SearchObserver>,
    debouncer: Debouncer,
    config: SearchConfig,
    data: Mutex<SessionData>,
}

/// Correction and intent surfaced by the backend for `text`
fn interpret(text: &str, info: Option<&QueryInfo>) -> (Option<SuggestionCorrection>, Option<String>) {
    let Some(info) = info else {
        return (None, None);
    };

    let correction = (info.was_corrected && !info.corrected.is_empty()).then(|| {
        let original = if info.original.is_empty() {
            text.trim().to_string()
        } else {
            info.original.clone()
        };
        SuggestionCorrection {
            original,
            corrected: info.corrected.clone(),
        }
    });
    let intent = info.intent.clone().filter(|i| !i.is_empty());

    (correction, intent)
}

impl SessionInner {
    fn lock(&self) -> MutexGuard<'_, SessionData> {
        self.data.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn is_trivial(&self, text: &str) -> bool {
        text.trim().chars().count() < self.config.min_query_len
    }

    fn set_state(&self, data: &mut SessionData, state: SessionState) {
        data.state = state;
        self.observer.state_changed(&data.state);
    }

    fn publish(&self, data: &mut SessionData, view: SearchView) {
        data.view = view;
        self.observer.view_changed(&data.view);
    }

    /// View for empty or very short input: history and trending, no suggestions
    fn idle_view(&self, data: &SessionData, text: &str) -> SearchView {
        SearchView {
            query: text.trim().to_string(),
            suggestions: Vec::new(),
            history: self.history.list(),
            trending: data.trending.clone(),
            correction: None,
            intent: None,
        }
    }

    /// Allocate the next sequence and enter `Requesting`
    fn issue(&self, data: &mut SessionData, text: &str, kind: RequestKind) -> SearchQuery {
        data.last_issued += 1;
        let query = SearchQuery {
            text: text.trim().to_string(),
            sequence: data.last_issued,
            kind,
            issued_at: Instant::now(),
        };
        data.in_flight = Some(query.clone());
        data.stats.issued += 1;

        // A correction belongs to the query it was offered for
        if data.view.correction.is_some() {
            let mut view = data.view.clone();
            view.correction = None;
            self.publish(data, view);
        }
        debug!("Issuing {:?} #{} for {:?}", kind, query.sequence, query.text);

        self.set_state(
            data,
            SessionState::Requesting {
                sequence: query.sequence,
                kind,
            },
        );
        query
    }

    fn debounce_fired(self: &Arc<Self>, epoch: u64, text: String) {
        let mut data = self.lock();
        if data.closed || data.input_epoch != epoch {
            return;
        }

        if self.is_trivial(&text) {
            // Retire the sequence of any lookup still running for longer input
            data.last_issued += 1;
            data.in_flight = None;
            let view = self.idle_view(&data, &text);
            self.publish(&mut data, view);
            self.set_state(&mut data, SessionState::Idle);
            return;
        }

        let query = self.issue(&mut data, &text, RequestKind::Suggestions);
        drop(data);
        self.spawn_suggestions(query);
    }

    fn submit(self: &Arc<Self>, text: &str) -> bool {
        if text.trim().is_empty() {
            return false;
        }

        let mut data = self.lock();
        if data.closed {
            return false;
        }
        self.debouncer.cancel_pending();
        data.input = text.trim().to_string();
        data.input_epoch += 1;

        let query = self.issue(&mut data, text, RequestKind::Search);
        drop(data);
        self.spawn_search(query);
        true
    }

    fn spawn_suggestions(self: &Arc<Self>, query: SearchQuery) {
        let catalog = self.catalog.clone();
        let language = self.config.language.clone();
        let session = Arc::downgrade(self);

        tokio::spawn(async move {
            let result = catalog.suggestions(&query.text, &language).await;
            match session.upgrade() {
                Some(inner) => inner.apply_suggestions(query, result),
                None => debug!("Session gone, dropping response #{}", query.sequence),
            }
        });
    }

    fn spawn_search(self: &Arc<Self>, query: SearchQuery) {
        let catalog = self.catalog.clone();
        let language = self.config.language.clone();
        let session = Arc::downgrade(self);

        tokio::spawn(async move {
            let result = catalog.search(&query.text, &language).await;
            match session.upgrade() {
                Some(inner) => inner.apply_search(query, result),
                None => debug!("Session gone, dropping response #{}", query.sequence),
            }
        });
    }

    /// Whether a response for `query` may touch visible state
    fn accept_response(&self, data: &mut SessionData, query: &SearchQuery) -> bool {
        if data.closed {
            debug!("Session closed, dropping response #{}", query.sequence);
            return false;
        }

        if query.sequence != data.last_issued {
            debug!(
                "Discarding superseded response #{} (latest #{})",
                query.sequence, data.last_issued
            );
            data.stats.discarded += 1;
            self.observer.response_discarded(query.sequence);
            return false;
        }

        debug!(
            "Response #{} arrived after {:?}",
            query.sequence,
            query.issued_at.elapsed()
        );
        data.in_flight = None;
        true
    }

    fn apply_suggestions(&self, query: SearchQuery, result: Result<SuggestionResponse, ApiError>) {
        let mut data = self.lock();
        if !self.accept_response(&mut data, &query) {
            return;
        }

        match result {
            Ok(response) => {
                let (correction, intent) = interpret(&query.text, response.query_info.as_ref());
                let view = SearchView {
                    query: query.text.clone(),
                    suggestions: response.suggestions,
                    history: Vec::new(),
                    trending: Vec::new(),
                    correction,
                    intent,
                };
                data.stats.resolved += 1;
                self.publish(&mut data, view);
                self.set_state(
                    &mut data,
                    SessionState::Resolved {
                        sequence: query.sequence,
                        kind: query.kind,
                    },
                );
            }
            Err(err) => self.fail(&mut data, &query, &err),
        }
    }

    fn apply_search(&self, query: SearchQuery, result: Result<SearchResults, ApiError>) {
        let mut data = self.lock();
        if !self.accept_response(&mut data, &query) {
            return;
        }

        match result {
            Ok(results) => {
                if let Err(e) = self.history.record(&query.text) {
                    warn!("Failed to record search history: {}", e);
                }

                let (correction, intent) = interpret(&query.text, results.query_info.as_ref());
                let view = SearchView {
                    query: query.text.clone(),
                    suggestions: results.suggestions.clone(),
                    history: Vec::new(),
                    trending: Vec::new(),
                    correction,
                    intent,
                };
                data.stats.resolved += 1;
                self.observer.results_ready(&query.text, &results);
                self.publish(&mut data, view);
                self.set_state(
                    &mut data,
                    SessionState::Resolved {
                        sequence: query.sequence,
                        kind: query.kind,
                    },
                );
            }
            Err(err) => self.fail(&mut data, &query, &err),
        }
    }

    /// Fail soft: keep the last view, report the error as a notice
    fn fail(&self, data: &mut SessionData, query: &SearchQuery, err: &ApiError) {
        warn!("{:?} request #{} failed: {}", query.kind, query.sequence, err);
        data.stats.failed += 1;
        self.set_state(
            data,
            SessionState::Failed {
                sequence: query.sequence,
                kind: query.kind,
            },
        );
        self.observer.search_failed(err);
    }
}

/// One search experience (one search box).
///
/// Requires a tokio runtime. Sessions are independent of each other and may
/// share one [`Catalog`] and its gateway. Dropping the session closes it.
pub struct SearchSession {
    inner: Arc<SessionInner>,
}

impl SearchSession {
    pub fn new(
        catalog: Catalog,
        history: Arc<LocalHistoryStore>,
        observer: Arc<dyn SearchObserver>,
        config: SearchConfig,
    ) -> Self {
        let view = SearchView {
            history: history.list(),
            ..SearchView::default()
        };

        Self {
            inner: Arc::new(SessionInner {
                catalog,
                history,
                observer,
                debouncer: Debouncer::new(),
                config,
                data: Mutex::new(SessionData {
                    state: SessionState::Idle,
                    input: String::new(),
                    input_epoch: 0,
                    last_issued: 0,
                    in_flight: None,
                    view,
                    trending: Vec::new(),
                    stats: SessionStats::default(),
                    closed: false,
                }),
            }),
        }
    }

    /// The search box text changed; restarts the debounce timer
    pub fn on_input_change(&self, text: &str) {
        let mut data = self.inner.lock();
        if data.closed {
            return;
        }

        data.input = text.to_string();
        data.input_epoch += 1;
        let epoch = data.input_epoch;
        self.inner.set_state(&mut data, SessionState::Debouncing);

        let session = Arc::downgrade(&self.inner);
        let text = text.to_string();
        self.inner
            .debouncer
            .schedule(self.inner.config.debounce, move || {
                if let Some(inner) = session.upgrade() {
                    inner.debounce_fired(epoch, text);
                }
            });
    }

    /// Enter pressed: search immediately. Returns false for blank input or a
    /// closed session.
    pub fn on_submit(&self, text: &str) -> bool {
        self.inner.submit(text)
    }

    pub fn on_suggestion_accepted(&self, text: &str) -> bool {
        self.inner.submit(text)
    }

    pub fn on_history_selected(&self, text: &str) -> bool {
        self.inner.submit(text)
    }

    pub fn on_trending_selected(&self, text: &str) -> bool {
        self.inner.submit(text)
    }

    /// A speech recognizer produced a final transcript
    pub fn on_voice_transcript(&self, transcript: &str) -> bool {
        self.inner.submit(transcript)
    }

    /// Search for the offered spelling correction, if any
    pub fn accept_correction(&self) -> bool {
        let corrected = {
            let mut data = self.inner.lock();
            match data.view.correction.take() {
                Some(correction) => correction.corrected,
                None => return false,
            }
        };
        self.inner.submit(&corrected)
    }

    /// Hide the offered spelling correction
    pub fn dismiss_correction(&self) {
        let mut data = self.inner.lock();
        if data.closed || data.view.correction.is_none() {
            return;
        }
        let mut view = data.view.clone();
        view.correction = None;
        self.inner.publish(&mut data, view);
    }

    /// Fetch trending searches (cached by the gateway) for the idle view
    pub async fn load_trending(&self) -> Result<Vec<String>, ApiError> {
        let trending = self.inner.catalog.popular_searches().await?;

        let mut data = self.inner.lock();
        if data.closed {
            return Ok(trending);
        }
        data.trending = trending.clone();

        let showing_idle = self.inner.is_trivial(&data.input)
            && matches!(data.state, SessionState::Idle | SessionState::Debouncing);
        if showing_idle {
            let input = data.input.clone();
            let view = self.inner.idle_view(&data, &input);
            self.inner.publish(&mut data, view);
        }
        Ok(trending)
    }

    /// Tear the session down; later responses are discarded
    pub fn close(&self) {
        let mut data = self.inner.lock();
        if data.closed {
            return;
        }
        data.closed = true;
        data.in_flight = None;
        self.inner.debouncer.cancel_pending();
        debug!("Search session closed after {} requests", data.stats.issued);
    }

    pub fn is_closed(&self) -> bool {
        self.inner.lock().closed
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    /// Last published view
    pub fn view(&self) -> SearchView {
        self.inner.lock().view.clone()
    }

    pub fn input(&self) -> String {
        self.inner.lock().input.clone()
    }

    /// Most recently issued sequence number (0 before the first request)
    pub fn last_sequence(&self) -> u64 {
        self.inner.lock().last_issued
    }

    /// Request whose response is still awaited, if any
    pub fn in_flight(&self) -> Option<SearchQuery> {
        self.inner.lock().in_flight.clone()
    }

    pub fn stats(&self) -> SessionStats {
        self.inner.lock().stats
    }

    pub fn config(&self) -> &SearchConfig {
        &self.inner.config
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.close();
    }
}
