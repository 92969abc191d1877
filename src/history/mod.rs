//! Recent search history
//!
//! A capped, de-duplicated, newest-first list of past queries kept in a
//! host-provided [`KeyValueStore`] as a JSON array.

pub mod store;

pub use store::{FileStore, KeyValueStore, MemoryStore};

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Store key holding the serialized history
pub const HISTORY_KEY: &str = "recent_searches";

/// Default number of remembered queries
pub const DEFAULT_HISTORY_LIMIT: usize = 10;

/// One remembered query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub query: String,
    pub timestamp: DateTime<Utc>,
}

/// Case-insensitive comparison form; never stored
fn fold(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Shared by every session of a process; writes are serialized so
/// concurrent records never drop each other's entries.
pub struct LocalHistoryStore {
    store: Arc<dyn KeyValueStore>,
    limit: usize,
    write_lock: Mutex<()>,
}

impl LocalHistoryStore {
    pub fn new(store: Arc<dyn KeyValueStore>, limit: usize) -> Self {
        Self {
            store,
            limit,
            write_lock: Mutex::new(()),
        }
    }

    /// History kept only for the life of the process
    pub fn in_memory(limit: usize) -> Self {
        Self::new(Arc::new(MemoryStore::new()), limit)
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Remember `text` as the most recent query.
    ///
    /// The trimmed text is stored as typed; an existing entry equal to it
    /// ignoring case is replaced. Blank input is ignored.
    pub fn record(&self, text: &str) -> Result<()> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let folded = fold(trimmed);
        let mut entries = self.list();
        entries.retain(|entry| fold(&entry.query) != folded);
        entries.insert(
            0,
            HistoryEntry {
                query: trimmed.to_string(),
                timestamp: Utc::now(),
            },
        );
        entries.truncate(self.limit);

        let json = serde_json::to_string(&entries)?;
        self.store.set(HISTORY_KEY, &json)?;
        Ok(())
    }

    /// Snapshot of the history, newest first.
    ///
    /// Unreadable or corrupt stored data reads as an empty history.
    pub fn list(&self) -> Vec<HistoryEntry> {
        let raw = match self.store.get(HISTORY_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read search history: {}", e);
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
            Ok(mut entries) => {
                entries.truncate(self.limit);
                entries
            }
            Err(e) => {
                warn!("Ignoring corrupt search history: {}", e);
                Vec::new()
            }
        }
    }

    /// Entries whose query starts with `prefix`, ignoring case
    pub fn matching(&self, prefix: &str) -> Vec<HistoryEntry> {
        let folded = fold(prefix);
        self.list()
            .into_iter()
            .filter(|entry| fold(&entry.query).starts_with(&folded))
            .collect()
    }

    pub fn clear(&self) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        self.store.remove(HISTORY_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queries(history: &LocalHistoryStore) -> Vec<String> {
        history.list().into_iter().map(|e| e.query).collect()
    }

    #[test]
    fn test_record_newest_first() {
        let history = LocalHistoryStore::in_memory(10);
        history.record("laptop").unwrap();
        history.record("phone").unwrap();

        assert_eq!(queries(&history), vec!["phone", "laptop"]);
    }

    #[test]
    fn test_case_and_whitespace_dedup_keeps_latest_text() {
        let history = LocalHistoryStore::in_memory(10);
        history.record("Phone").unwrap();
        history.record("phone ").unwrap();

        let entries = history.list();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].query, "phone");
    }

    #[test]
    fn test_rerecord_moves_to_front() {
        let history = LocalHistoryStore::in_memory(10);
        history.record("a1").unwrap();
        history.record("b2").unwrap();
        history.record("A1").unwrap();

        assert_eq!(queries(&history), vec!["A1", "b2"]);
    }

    #[test]
    fn test_capped_at_limit() {
        let history = LocalHistoryStore::in_memory(3);
        for q in ["one", "two", "three", "four", "five"] {
            history.record(q).unwrap();
        }

        assert_eq!(queries(&history), vec!["five", "four", "three"]);
    }

    #[test]
    fn test_blank_ignored() {
        let history = LocalHistoryStore::in_memory(10);
        history.record("   ").unwrap();
        assert!(history.list().is_empty());
    }

    #[test]
    fn test_clear() {
        let history = LocalHistoryStore::in_memory(10);
        history.record("phone").unwrap();
        history.clear().unwrap();
        assert!(history.list().is_empty());
    }

    #[test]
    fn test_corrupt_data_reads_empty_and_recovers() {
        let store = Arc::new(MemoryStore::new());
        store.set(HISTORY_KEY, "garbage").unwrap();

        let history = LocalHistoryStore::new(store, 10);
        assert!(history.list().is_empty());

        history.record("phone").unwrap();
        assert_eq!(queries(&history), vec!["phone"]);
    }

    #[test]
    fn test_matching_prefix() {
        let history = LocalHistoryStore::in_memory(10);
        history.record("iPhone 15").unwrap();
        history.record("ipad").unwrap();
        history.record("laptop").unwrap();

        let matches: Vec<String> = history
            .matching("IP")
            .into_iter()
            .map(|e| e.query)
            .collect();
        assert_eq!(matches, vec!["ipad", "iPhone 15"]);
    }

    #[test]
    fn test_concurrent_records_all_kept() {
        let history = Arc::new(LocalHistoryStore::in_memory(1000));

        let handles: Vec<_> = (0..8)
            .map(|t| {
                let history = Arc::clone(&history);
                std::thread::spawn(move || {
                    for i in 0..50 {
                        history.record(&format!("query {}-{}", t, i)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(history.list().len(), 400);
    }

    #[test]
    fn test_persists_through_shared_store() {
        let store: Arc<dyn KeyValueStore> = Arc::new(MemoryStore::new());
        LocalHistoryStore::new(store.clone(), 10)
            .record("tv")
            .unwrap();

        let again = LocalHistoryStore::new(store, 10);
        assert_eq!(queries(&again), vec!["tv"]);
    }
}
