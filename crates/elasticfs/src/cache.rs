//! Bounded LRU caches for fetched store content
//!
//! Uses moka's concurrent cache with a plain LRU eviction policy. Entries are
//! keyed by the request URL that produced them and are only ever dropped by
//! eviction; the store is assumed to change slowly over a mount's lifetime.

use std::future::Future;
use std::sync::Arc;

use moka::future::Cache;
use moka::policy::EvictionPolicy;

use crate::client::StoreError;

/// Entries kept per cache
pub const DEFAULT_CAPACITY: u64 = 50;

/// Read-through cache from request URL to decoded content
#[derive(Clone)]
pub struct ContentCache<V> {
    name: &'static str,
    entries: Cache<String, V>,
}

impl<V> ContentCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        Self::with_capacity(name, DEFAULT_CAPACITY)
    }

    pub fn with_capacity(name: &'static str, capacity: u64) -> Self {
        Self {
            name,
            entries: Cache::builder()
                .name(name)
                .max_capacity(capacity)
                .eviction_policy(EvictionPolicy::lru())
                .build(),
        }
    }

    /// Return the cached value for `key`, running `fetch` on a miss.
    ///
    /// Concurrent misses on one key share a single `fetch`. A failed fetch
    /// leaves no entry behind, so the next call tries again.
    pub async fn get_with<F>(&self, key: &str, fetch: F) -> Result<V, Arc<StoreError>>
    where
        F: Future<Output = Result<V, StoreError>>,
    {
        let name = self.name;
        self.entries
            .try_get_with(key.to_string(), async move {
                tracing::debug!(cache = name, %key, "cache miss");
                fetch.await
            })
            .await
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries, as of the last maintenance pass
    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }

    /// Apply pending inserts, reads and evictions now.
    pub async fn run_pending_tasks(&self) {
        self.entries.run_pending_tasks().await;
    }
}
