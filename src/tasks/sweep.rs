//! Cache Sweep Task
//!
//! Background task that periodically removes expired cache entries. Lookups
//! only reclaim entries that are requested again, so this is what keeps the
//! store from growing without bound.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedStore;

/// Spawns a background task that sweeps `cache` every `interval_secs`.
///
/// The task runs until the returned handle is aborted (normally on shutdown).
///
/// # Example
/// ```ignore
/// let cache = ExpiringStore::<Vec<BookRecord>>::new(10).into_shared();
/// let sweep_handle = spawn_sweep_task(cache.clone(), 10);
/// // Later, during shutdown:
/// sweep_handle.abort();
/// ```
pub fn spawn_sweep_task<V>(cache: SharedStore<V>, interval_secs: u64) -> JoinHandle<()>
where
    V: Send + Sync + 'static,
{
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache sweep task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let (removed, remaining) = {
                let mut cache_guard = cache.write().await;
                let removed = cache_guard.sweep_expired();
                (removed, cache_guard.len())
            };

            if removed > 0 {
                info!(removed, remaining, "cache sweep removed expired entries");
            } else {
                debug!(remaining, "cache sweep found no expired entries");
            }
        }
    })
}
