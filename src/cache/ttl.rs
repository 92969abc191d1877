//! Bounded in-memory cache with per-entry expiry
//!
//! Entries expire `ttl` after they were stored. Expired entries are invisible
//! to readers but are only physically dropped by [`TtlCache::sweep`], which
//! `set` runs when it needs room. Eviction is strictly insertion order
//! (oldest inserted first), not LRU: reads never reorder entries.

use std::sync::Arc;

use indexmap::IndexMap;
use log::debug;
use tokio::time::Instant;

use super::CacheConfig;
use crate::clock::{Clock, SystemClock};

/// A stored value with its insertion time
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub key: String,
    pub value: V,
    pub stored_at: Instant,
}

/// Counts of physically present entries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub total_entries: usize,
    pub valid_entries: usize,
    pub expired_entries: usize,
}

pub struct TtlCache<V> {
    entries: IndexMap<String, CacheEntry<V>>,
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: IndexMap::with_capacity(config.max_entries),
            config,
            clock,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn is_fresh(&self, entry: &CacheEntry<V>, now: Instant) -> bool {
        now.saturating_duration_since(entry.stored_at) < self.config.ttl
    }

    /// Get a fresh value. Never removes anything.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = self.clock.now();
        self.entries
            .get(key)
            .filter(|entry| self.is_fresh(entry, now))
            .map(|entry| entry.value.clone())
    }

    /// Whether a fresh value exists for `key`
    pub fn has(&self, key: &str) -> bool {
        let now = self.clock.now();
        self.entries
            .get(key)
            .is_some_and(|entry| self.is_fresh(entry, now))
    }

    /// Insert or overwrite `key`.
    ///
    /// An overwrite is a re-insertion: the entry moves to the newest position.
    /// When a new key arrives at capacity, expired entries are swept first and
    /// then, if still full, the single oldest-inserted entry is evicted.
    pub fn set(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();

        if self.entries.shift_remove(&key).is_none()
            && self.config.max_entries > 0
            && self.entries.len() >= self.config.max_entries
        {
            self.sweep();
            if self.entries.len() >= self.config.max_entries
                && let Some((evicted, _)) = self.entries.shift_remove_index(0)
            {
                debug!("Cache full, evicted oldest entry {}", evicted);
            }
        }

        if self.config.max_entries == 0 {
            return;
        }

        let entry = CacheEntry {
            key: key.clone(),
            value,
            stored_at: self.clock.now(),
        };
        self.entries.insert(key, entry);
    }

    /// Remove one entry regardless of its expiry state
    pub fn remove(&mut self, key: &str) -> bool {
        self.entries.shift_remove(key).is_some()
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Physically drop expired entries, returning how many were removed
    pub fn sweep(&mut self) -> usize {
        let now = self.clock.now();
        let ttl = self.config.ttl;
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.saturating_duration_since(entry.stored_at) < ttl);
        before - self.entries.len()
    }

    /// Number of physically present entries, expired ones included
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let valid = self
            .entries
            .values()
            .filter(|entry| self.is_fresh(entry, now))
            .count();

        CacheStats {
            total_entries: self.entries.len(),
            valid_entries: valid,
            expired_entries: self.entries.len() - valid,
        }
    }
}
