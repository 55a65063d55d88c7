//! Expiring Store Module
//!
//! Key-value map where every entry lives for one store-wide TTL. Expired
//! entries are reclaimed lazily on lookup and in bulk by [`ExpiringStore::sweep`].

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheEntry, CacheStats};

/// Store handle shared between request handlers and the sweep task.
///
/// Every operation that touches the map goes through the single write lock.
pub type SharedStore<V> = Arc<RwLock<ExpiringStore<V>>>;

// == Expiring Store ==
/// In-memory map with TTL expiry and no capacity bound.
#[derive(Debug)]
pub struct ExpiringStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    stats: CacheStats,
    /// TTL in seconds applied to every entry
    ttl: u64,
}

impl<V> ExpiringStore<V> {
    // == Constructor ==
    /// Creates an empty store whose entries live for `ttl_seconds`.
    pub fn new(ttl_seconds: u64) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            ttl: ttl_seconds,
        }
    }

    /// Wraps the store for sharing across tasks.
    pub fn into_shared(self) -> SharedStore<V> {
        Arc::new(RwLock::new(self))
    }

    /// TTL in seconds applied to every entry.
    pub fn ttl(&self) -> u64 {
        self.ttl
    }

    // == Get ==
    /// Retrieves a live value by key.
    ///
    /// An expired entry is removed and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<Arc<V>> {
        self.get_at(key, current_timestamp_ms())
    }

    /// [`get`](Self::get) against an explicit clock reading.
    pub fn get_at(&mut self, key: &str, now_ms: u64) -> Option<Arc<V>> {
        let expired = match self.entries.get(key) {
            None => {
                self.stats.record_miss();
                return None;
            }
            Some(entry) => entry.is_expired_at(now_ms),
        };

        if expired {
            self.entries.remove(key);
            self.stats.record_expirations(1);
            self.stats.set_total_entries(self.entries.len());
            self.stats.record_miss();
            return None;
        }

        self.stats.record_hit();
        self.entries.get(key).map(|entry| Arc::clone(&entry.value))
    }

    // == Put ==
    /// Stores `value` under `key`, replacing any previous entry and resetting
    /// its expiry to now + TTL. Always succeeds.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<Arc<V>>) -> bool {
        self.put_at(key, value, current_timestamp_ms())
    }

    /// [`put`](Self::put) against an explicit clock reading.
    pub fn put_at(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Arc<V>>,
        now_ms: u64,
    ) -> bool {
        let entry = CacheEntry::new(value.into(), self.ttl, now_ms);
        self.entries.insert(key.into(), entry);
        self.stats.set_total_entries(self.entries.len());
        true
    }

    // == Sweep ==
    /// Removes every entry that expired before `now_ms`.
    ///
    /// Returns the number of entries removed.
    pub fn sweep(&mut self, now_ms: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now_ms));
        let removed = before - self.entries.len();

        self.stats.record_expirations(removed);
        self.stats.set_total_entries(self.entries.len());
        removed
    }

    /// Sweeps against the wall clock.
    pub fn sweep_expired(&mut self) -> usize {
        self.sweep(current_timestamp_ms())
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    /// Returns the current number of entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
