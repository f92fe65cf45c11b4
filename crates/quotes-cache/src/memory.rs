//! In-memory cache implementation.

use async_trait::async_trait;
use quotes_core::{CacheStats, Clock, Dataset, QuoteCache, RequestKey, SystemClock, is_fresh};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::sync::RwLock;
use tracing::{debug, instrument};

use crate::parquet::DEFAULT_EXPIRATION;

/// Cache entry with timestamp for expiration checks.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    cached_at: SystemTime,
}

/// Simple in-memory cache for testing and embedding.
///
/// Data is stored in a `RwLock`-protected `HashMap` and is lost when the cache
/// is dropped. Datasets are cloned on get/put operations. Freshness follows
/// the same rule as the disk cache.
#[derive(Debug)]
pub struct InMemoryCache {
    entries: RwLock<HashMap<RequestKey, CacheEntry<Dataset>>>,
    expiration: Duration,
    clock: Arc<dyn Clock>,
}

impl InMemoryCache {
    /// Create a new empty in-memory cache with the default expiration window.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(DEFAULT_EXPIRATION, Arc::new(SystemClock))
    }

    /// Create a cache with a custom expiration window and clock.
    #[must_use]
    pub fn with_clock(expiration: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            expiration,
            clock,
        }
    }

    fn is_entry_fresh(&self, entry: &CacheEntry<Dataset>, now: SystemTime) -> bool {
        is_fresh(entry.cached_at, now, self.expiration)
    }
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteCache for InMemoryCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &RequestKey) -> Option<Dataset> {
        let now = self.clock.now();
        let cache = self.entries.read().await;
        match cache.get(key) {
            Some(entry) if self.is_entry_fresh(entry, now) => {
                debug!("Cache hit");
                Some(entry.data.clone())
            }
            Some(_) => {
                debug!("Cache entry expired");
                None
            }
            None => {
                debug!("Cache miss");
                None
            }
        }
    }

    #[instrument(skip(self, dataset), fields(key = %key, rows = dataset.height()))]
    async fn put(&self, dataset: &Dataset, key: &RequestKey) -> bool {
        let entry = CacheEntry {
            data: dataset.clone(),
            cached_at: self.clock.now(),
        };
        self.entries.write().await.insert(key.clone(), entry);
        debug!("Cached dataset");
        true
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self) -> usize {
        let now = self.clock.now();
        let mut cache = self.entries.write().await;
        let before = cache.len();
        cache.retain(|_, entry| self.is_entry_fresh(entry, now));
        let removed = before - cache.len();
        if removed > 0 {
            debug!("Removed {} expired cache entries", removed);
        }
        removed
    }

    #[instrument(skip(self))]
    async fn purge_all(&self) -> usize {
        let mut cache = self.entries.write().await;
        let removed = cache.len();
        cache.clear();
        debug!("Removed {} cache entries", removed);
        removed
    }

    async fn stats(&self) -> CacheStats {
        let now = self.clock.now();
        let cache = self.entries.read().await;
        let valid = cache
            .values()
            .filter(|entry| self.is_entry_fresh(entry, now))
            .count();
        CacheStats {
            total: cache.len(),
            valid,
            expired: cache.len() - valid,
            total_size: cache
                .values()
                .map(|entry| entry.data.frame().estimated_size() as u64)
                .sum(),
            location: None,
        }
    }
}
