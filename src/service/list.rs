//! Read-through list service
//!
//! Serves list requests from the expiring store and falls back to storage on
//! a miss. There is no request coalescing: concurrent misses for the same key
//! each run the query and each write the (identical) result.

use std::sync::Arc;

use tracing::{debug, error};

use crate::cache::{derive_key, SharedStore};
use crate::error::{Result, ServiceError};
use crate::models::{BookRecord, ListOptions};
use crate::query::CompiledQuery;
use crate::storage::BookStorage;

/// Cached result of one list query. Shared, treat as read-only.
pub type BookList = Arc<Vec<BookRecord>>;

/// Lists books through the result cache.
#[derive(Clone)]
pub struct ListService {
    cache: SharedStore<Vec<BookRecord>>,
    storage: Arc<dyn BookStorage>,
}

impl ListService {
    pub fn new(cache: SharedStore<Vec<BookRecord>>, storage: Arc<dyn BookStorage>) -> Self {
        Self { cache, storage }
    }

    /// The store backing this service.
    pub fn cache(&self) -> &SharedStore<Vec<BookRecord>> {
        &self.cache
    }

    /// Returns the books for `options`.
    ///
    /// A cache hit is returned as-is for the rest of its TTL, even if storage
    /// has changed since. On a miss the query runs on its own task, so the
    /// result is cached even if the caller stops waiting for it. Storage
    /// errors are returned unchanged and nothing is cached.
    pub async fn list(&self, options: &ListOptions) -> Result<BookList> {
        let key = derive_key(Some(options));

        let cached = self.cache.write().await.get(&key);
        if let Some(books) = cached {
            debug!(key = %key, "list cache hit");
            return Ok(books);
        }
        debug!(key = %key, "list cache miss");

        let query = CompiledQuery::from(options);
        let storage = Arc::clone(&self.storage);
        let cache = Arc::clone(&self.cache);

        let fetch = tokio::spawn(async move {
            let books: BookList = match storage.execute(&query).await {
                Ok(books) => Arc::new(books),
                Err(e) => {
                    error!(error = %e, sql = %query.to_sql(), "list query failed");
                    return Err(e);
                }
            };

            cache.write().await.put(key, Arc::clone(&books));
            Ok(books)
        });

        fetch
            .await
            .map_err(|e| ServiceError::Internal(format!("list query task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ExpiringStore;
    use crate::models::FilterSpec;
    use crate::storage::MemoryStorage;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Storage double counting executions.
    struct CountingStorage {
        inner: MemoryStorage,
        calls: AtomicUsize,
        fail: bool,
        delay: Duration,
    }

    impl CountingStorage {
        fn new(books: Vec<BookRecord>) -> Self {
            Self {
                inner: MemoryStorage::new(books),
                calls: AtomicUsize::new(0),
                fail: false,
                delay: Duration::ZERO,
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl BookStorage for CountingStorage {
        async fn execute(&self, query: &CompiledQuery) -> Result<Vec<BookRecord>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if self.fail {
                return Err(ServiceError::Storage("connection refused".to_string()));
            }
            self.inner.execute(query).await
        }
    }

    fn books() -> Vec<BookRecord> {
        vec![
            BookRecord::new(1, "Moby Dick", "Whale.", "moby.png", "1851-10-18", "Herman Melville"),
            BookRecord::new(2, "Dune", "Sand.", "dune.png", "1965-08-01", "Frank Herbert"),
        ]
    }

    fn service_with(storage: Arc<CountingStorage>, ttl: u64) -> ListService {
        ListService::new(ExpiringStore::new(ttl).into_shared(), storage)
    }

    #[tokio::test]
    async fn test_second_call_is_served_from_cache() {
        let storage = Arc::new(CountingStorage::new(books()));
        let service = service_with(storage.clone(), 60);
        let options = ListOptions::new(20, 0, FilterSpec::new());

        let first = service.list(&options).await.unwrap();
        assert_eq!(storage.calls(), 1);

        let second = service.list(&options).await.unwrap();
        assert_eq!(storage.calls(), 1);
        assert_eq!(first, second);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_distinct_options_miss_separately() {
        let storage = Arc::new(CountingStorage::new(books()));
        let service = service_with(storage.clone(), 60);

        let all = service
            .list(&ListOptions::new(20, 0, FilterSpec::new()))
            .await
            .unwrap();
        let dune = service
            .list(&ListOptions::new(20, 0, FilterSpec::new().with("title", "dune")))
            .await
            .unwrap();

        assert_eq!(storage.calls(), 2);
        assert_eq!(all.len(), 2);
        assert_eq!(dune.len(), 1);
        assert_eq!(dune[0].id, 2);
    }

    #[tokio::test]
    async fn test_hit_ignores_storage_changes() {
        let storage = Arc::new(CountingStorage::new(books()));
        let service = service_with(storage.clone(), 60);
        let options = ListOptions::new(20, 0, FilterSpec::new());

        let before = service.list(&options).await.unwrap();
        storage
            .inner
            .insert(BookRecord::new(3, "Emma", "Matchmaking.", "emma.png", "1815-12-23", "Jane Austen"))
            .await;
        let after = service.list(&options).await.unwrap();

        assert_eq!(before.len(), 2);
        assert_eq!(after.len(), 2, "Stale result is served until the TTL elapses");
    }

    #[tokio::test]
    async fn test_storage_error_is_propagated_and_not_cached() {
        let mut failing = CountingStorage::new(books());
        failing.fail = true;
        let storage = Arc::new(failing);
        let service = service_with(storage.clone(), 60);
        let options = ListOptions::new(20, 0, FilterSpec::new());

        let result = service.list(&options).await;
        assert!(matches!(result, Err(ServiceError::Storage(msg)) if msg == "connection refused"));

        let _ = service.list(&options).await;
        assert_eq!(storage.calls(), 2);
        assert!(service.cache().read().await.is_empty());
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_new_query() {
        let storage = Arc::new(CountingStorage::new(books()));
        let service = service_with(storage.clone(), 1);
        let options = ListOptions::new(20, 0, FilterSpec::new());

        service.list(&options).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1100)).await;
        service.list(&options).await.unwrap();

        assert_eq!(storage.calls(), 2);
    }

    #[tokio::test]
    async fn test_abandoned_request_still_populates_cache() {
        let mut slow = CountingStorage::new(books());
        slow.delay = Duration::from_millis(200);
        let storage = Arc::new(slow);
        let service = service_with(storage.clone(), 60);
        let options = ListOptions::new(20, 0, FilterSpec::new());

        // Caller gives up well before storage answers
        let abandoned = tokio::time::timeout(Duration::from_millis(20), service.list(&options)).await;
        assert!(abandoned.is_err());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(service.cache().read().await.len(), 1);

        service.list(&options).await.unwrap();
        assert_eq!(storage.calls(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_misses_are_not_coalesced() {
        let mut slow = CountingStorage::new(books());
        slow.delay = Duration::from_millis(100);
        let storage = Arc::new(slow);
        let service = service_with(storage.clone(), 60);
        let options = ListOptions::new(20, 0, FilterSpec::new());

        let (a, b) = tokio::join!(service.list(&options), service.list(&options));

        assert_eq!(a.unwrap(), b.unwrap());
        assert_eq!(storage.calls(), 2);
        assert_eq!(service.cache().read().await.len(), 1);
    }
}
