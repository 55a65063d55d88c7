//! Cache Module
//!
//! Process-local result cache: key derivation plus an expiring in-memory store.

mod entry;
pub mod key;
mod stats;
mod store;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use key::derive_key;
pub use stats::CacheStats;
pub use store::{ExpiringStore, SharedStore};
