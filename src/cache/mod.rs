//! In-memory response cache
//!
//! Session-scoped only: nothing here survives a process restart. The cache
//! exists to avoid re-fetching slow-changing storefront taxonomies
//! (categories, brands, languages) within one run.

pub mod key;
pub mod ttl;

use std::time::Duration;

/// Default number of entries held before eviction
pub const DEFAULT_MAX_ENTRIES: usize = 100;

/// Default time-to-live for cached responses
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60); // 5 min

/// Capacity and expiry settings, fixed when the cache is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            ttl: DEFAULT_TTL,
        }
    }
}

pub use key::cache_key;
pub use ttl::{CacheEntry, CacheStats, TtlCache};
