//! Cache trait for storing fetched datasets.
//!
//! This module defines the [`QuoteCache`] trait that every dataset store
//! implements, and [`CacheStats`], the diagnostic snapshot it reports.
//!
//! None of the operations return errors: a cache is an optimization, so
//! implementations log failures and report them as a miss, a `false` write or
//! a skipped deletion.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::{dataset::Dataset, types::RequestKey};

/// Trait for caching fetched datasets by request key.
#[async_trait]
pub trait QuoteCache: Send + Sync + std::fmt::Debug {
    /// Retrieves the dataset stored under `key` if it is still fresh.
    ///
    /// Missing, expired and unreadable entries all return `None`.
    async fn get(&self, key: &RequestKey) -> Option<Dataset>;

    /// Stores `dataset` under `key`, replacing any earlier entry.
    ///
    /// Returns `false` if the entry could not be written.
    async fn put(&self, dataset: &Dataset, key: &RequestKey) -> bool;

    /// Removes every entry that is no longer fresh.
    ///
    /// Returns the number of entries removed.
    async fn purge_expired(&self) -> usize;

    /// Removes every entry.
    ///
    /// Returns the number of entries removed.
    async fn purge_all(&self) -> usize;

    /// Scans the cache and reports its current state.
    async fn stats(&self) -> CacheStats;
}

/// Snapshot of a cache's contents.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of entries.
    pub total: usize,
    /// Entries that pass the freshness check now.
    pub valid: usize,
    /// Entries that fail the freshness check now.
    pub expired: usize,
    /// Storage footprint in bytes.
    pub total_size: u64,
    /// Where entries are stored, for disk-backed caches.
    pub location: Option<PathBuf>,
}

impl CacheStats {
    /// Returns the storage footprint in mebibytes, rounded to two decimals.
    #[must_use]
    pub fn total_size_mb(&self) -> f64 {
        (self.total_size as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
    }
}
