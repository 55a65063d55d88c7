//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
///
/// The value is shared: readers get another handle to the same allocation and
/// must clone it themselves before mutating.
#[derive(Debug)]
pub struct CacheEntry<V> {
    /// The stored value
    pub value: Arc<V>,
    /// Creation timestamp (Unix milliseconds)
    pub created_at: u64,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
}

impl<V> Clone for CacheEntry<V> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl_seconds` after `now_ms`.
    pub fn new(value: Arc<V>, ttl_seconds: u64, now_ms: u64) -> Self {
        Self {
            value,
            created_at: now_ms,
            expires_at: now_ms.saturating_add(ttl_seconds.saturating_mul(1000)),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// An entry whose expiry equals `now_ms` is still live; it becomes
    /// expired strictly after that instant.
    pub fn is_expired_at(&self, now_ms: u64) -> bool {
        self.expires_at < now_ms
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}
