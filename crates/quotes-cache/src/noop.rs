//! No-op cache implementation.

use async_trait::async_trait;
use quotes_core::{CacheStats, Dataset, QuoteCache, RequestKey};
use tracing::trace;

/// A no-op cache that doesn't store anything.
///
/// `get` always misses and `put` always reports success, so a client built
/// with it goes to the upstream on every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl NoopCache {
    /// Create a new no-op cache.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl QuoteCache for NoopCache {
    async fn get(&self, _key: &RequestKey) -> Option<Dataset> {
        trace!("NoopCache: get called, returning None");
        None
    }

    async fn put(&self, _dataset: &Dataset, _key: &RequestKey) -> bool {
        trace!("NoopCache: put called, doing nothing");
        true
    }

    async fn purge_expired(&self) -> usize {
        trace!("NoopCache: purge_expired called, returning 0");
        0
    }

    async fn purge_all(&self) -> usize {
        trace!("NoopCache: purge_all called, returning 0");
        0
    }

    async fn stats(&self) -> CacheStats {
        CacheStats::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use quotes_core::{OutputSize, TimeSeriesFunction};

    #[tokio::test]
    async fn test_noop_cache_never_hits() {
        let cache = NoopCache::new();
        let key =
            RequestKey::new("AAPL", TimeSeriesFunction::Daily, None, OutputSize::Compact).unwrap();
        let ts = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let data = Dataset::new(vec![ts], vec![("Close".to_string(), vec![Some(1.0)])]).unwrap();

        assert!(cache.put(&data, &key).await);
        assert!(cache.get(&key).await.is_none());
        assert_eq!(cache.purge_expired().await, 0);
        assert_eq!(cache.purge_all().await, 0);
        assert_eq!(cache.stats().await, CacheStats::default());
    }
}
