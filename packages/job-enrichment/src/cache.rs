//! Bounded, time-expiring cache of extracted detail-page text.
//!
//! One mutex guards the whole map. Both `get` (read, check, expire) and `put`
//! (evict, insert) run as a single critical section, and nothing inside the
//! lock awaits or touches the network.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::clock::{Clock, SystemClock};

/// Entries older than this are treated as absent.
pub const DEFAULT_TTL_SECS: i64 = 30 * 60;

/// The cache never holds more entries than this.
pub const DEFAULT_MAX_ENTRIES: usize = 300;

/// Limits for a [`DetailCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum age of an entry before it must be refetched
    pub ttl: Duration,

    /// Maximum number of entries held at once
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::seconds(DEFAULT_TTL_SECS),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }
}

impl CacheConfig {
    /// Set the time-to-live.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the maximum entry count.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }
}

/// Cached detail-page text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub raw_text: String,
    pub fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.fetched_at > ttl
    }
}

/// Counters since the cache was created (or last cleared).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Lookups that found an entry past its TTL and dropped it
    pub expired: u64,
    /// Entries removed to make room for a new key
    pub evictions: u64,
}

#[derive(Default)]
struct CacheState {
    entries: HashMap<String, CacheEntry>,
    stats: CacheStats,
}

/// URL-keyed cache of extracted page text with TTL expiry and a size bound.
///
/// Construct one per process and share it by `Arc` with every fetcher.
pub struct DetailCache {
    state: Mutex<CacheState>,
    clock: Arc<dyn Clock>,
    config: CacheConfig,
}

impl Default for DetailCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl DetailCache {
    /// Create a cache driven by the system clock.
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache driven by the given clock.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(CacheState::default()),
            clock,
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // Map operations cannot leave the state inconsistent, so a poisoned
    // lock is still safe to use.
    fn lock(&self) -> MutexGuard<'_, CacheState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Return the cached text for `url` if it is still fresh.
    ///
    /// A stale entry is removed as part of the lookup.
    pub fn get(&self, url: &str) -> Option<String> {
        let now = self.clock.now();
        let mut guard = self.lock();
        let state = &mut *guard;

        let expired = match state.entries.get(url) {
            Some(entry) if !entry.is_expired(now, self.config.ttl) => {
                let text = entry.raw_text.clone();
                state.stats.hits += 1;
                return Some(text);
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            state.entries.remove(url);
            state.stats.expired += 1;
            debug!(url = %url, "Detail cache entry expired");
        }
        state.stats.misses += 1;
        None
    }

    /// Insert or overwrite the entry for `url`, stamped with the current time.
    ///
    /// Adding a new key at capacity first evicts the entry with the oldest
    /// `fetched_at` (ties go to the smallest URL).
    pub fn put(&self, url: impl Into<String>, text: impl Into<String>) {
        if self.config.max_entries == 0 {
            return;
        }

        let url = url.into();
        let entry = CacheEntry {
            raw_text: text.into(),
            fetched_at: self.clock.now(),
        };
        let mut guard = self.lock();
        let state = &mut *guard;

        if !state.entries.contains_key(&url) && state.entries.len() >= self.config.max_entries {
            let oldest = state
                .entries
                .iter()
                .min_by(|(a_url, a), (b_url, b)| {
                    a.fetched_at.cmp(&b.fetched_at).then_with(|| a_url.cmp(b_url))
                })
                .map(|(oldest_url, _)| oldest_url.clone());

            if let Some(oldest) = oldest {
                state.entries.remove(&oldest);
                state.stats.evictions += 1;
                debug!(evicted = %oldest, "Detail cache full, evicted oldest entry");
            }
        }

        state.entries.insert(url, entry);
    }

    /// Peek at an entry without TTL checks or stats.
    pub fn entry(&self, url: &str) -> Option<CacheEntry> {
        self.lock().entries.get(url).cloned()
    }

    /// Drop the entry for `url`, if any.
    pub fn remove(&self, url: &str) -> bool {
        self.lock().entries.remove(url).is_some()
    }

    /// Drop every entry and reset the counters.
    pub fn clear(&self) {
        let mut state = self.lock();
        state.entries.clear();
        state.stats = CacheStats::default();
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.lock().stats
    }
}
