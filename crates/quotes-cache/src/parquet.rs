//! Parquet-file cache implementation.

use async_trait::async_trait;
use polars::prelude::*;
use quotes_core::{CacheStats, Clock, Dataset, QuoteCache, QuoteError, RequestKey, SystemClock};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, instrument, warn};

/// Default directory for cache files, relative to the working directory.
pub const DEFAULT_CACHE_DIR: &str = ".cache/stock_data";

/// Default expiration window.
pub const DEFAULT_EXPIRATION: Duration = Duration::from_secs(24 * 60 * 60);

/// File extension of cache entries.
const EXTENSION: &str = "parquet";

/// Where and for how long a [`ParquetCache`] keeps entries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheConfig {
    /// Directory holding one file per request key.
    pub directory: PathBuf,
    /// Age at which an entry stops being reused.
    pub expiration: Duration,
}

impl CacheConfig {
    /// Creates a config for `directory` with the default expiration window.
    #[must_use]
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            expiration: DEFAULT_EXPIRATION,
        }
    }

    /// Sets the expiration window.
    #[must_use]
    pub const fn with_expiration(mut self, expiration: Duration) -> Self {
        self.expiration = expiration;
        self
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}

/// Failures while touching a single cache file. Never leaves this module.
#[derive(Debug, Error)]
enum EntryError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parquet error: {0}")]
    Polars(#[from] PolarsError),
    #[error("Invalid dataset: {0}")]
    Invalid(#[from] QuoteError),
}

/// Disk cache storing one parquet file per request key.
///
/// Entries live at `<directory>/<cache key>.parquet` and the file modification
/// time is the entry's creation time. The directory is created on the first
/// write; until then the cache reads as empty.
#[derive(Debug)]
pub struct ParquetCache {
    config: CacheConfig,
    clock: Arc<dyn Clock>,
}

impl ParquetCache {
    /// Create a cache using the system clock.
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a cache that judges freshness with `clock`.
    #[must_use]
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.config.directory
    }

    /// Returns the expiration window.
    #[must_use]
    pub const fn expiration(&self) -> Duration {
        self.config.expiration
    }

    /// Path of the file backing `key`.
    #[must_use]
    pub fn entry_path(&self, key: &RequestKey) -> PathBuf {
        self.config
            .directory
            .join(format!("{}.{EXTENSION}", key.cache_key()))
    }

    fn is_entry_fresh(&self, modified: SystemTime) -> bool {
        quotes_core::is_fresh(modified, self.clock.now(), self.config.expiration)
    }

    /// Lists every cache file. A missing directory is an empty cache.
    fn entries(&self) -> Vec<PathBuf> {
        let dir = match fs::read_dir(&self.config.directory) {
            Ok(dir) => dir,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(
                    error = %e,
                    dir = %self.config.directory.display(),
                    "Failed to list cache directory"
                );
                return Vec::new();
            }
        };
        dir.filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file())
            .filter(|path| path.extension().is_some_and(|ext| ext == EXTENSION))
            .collect()
    }

    fn read_entry(path: &Path) -> Result<Dataset, EntryError> {
        let file = File::open(path)?;
        let frame = ParquetReader::new(file).finish()?;
        Ok(Dataset::from_frame(frame)?)
    }

    /// Writes to a uniquely named temporary file in the cache directory and
    /// renames it over the entry, so readers see either the old file or the
    /// new one and overlapping writers never share a temporary file.
    fn write_entry(&self, path: &Path, dataset: &Dataset) -> Result<(), EntryError> {
        fs::create_dir_all(&self.config.directory)?;

        let mut tmp = NamedTempFile::new_in(&self.config.directory)?;
        let mut frame = dataset.frame().clone();
        ParquetWriter::new(tmp.as_file_mut()).finish(&mut frame)?;
        tmp.as_file().sync_all()?;

        // An unpersisted temp file is removed when dropped.
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Deletes `paths`, logging and skipping failures.
    fn remove_all(paths: impl IntoIterator<Item = PathBuf>) -> usize {
        let mut removed = 0usize;
        for path in paths {
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(error = %e, path = %path.display(), "Failed to remove cache entry"),
            }
        }
        removed
    }
}

fn modified(path: &Path) -> io::Result<SystemTime> {
    fs::metadata(path)?.modified()
}

#[async_trait]
impl QuoteCache for ParquetCache {
    #[instrument(skip(self), fields(key = %key))]
    async fn get(&self, key: &RequestKey) -> Option<Dataset> {
        let path = self.entry_path(key);

        let modified = match modified(&path) {
            Ok(modified) => modified,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Cache miss");
                return None;
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to stat cache entry");
                return None;
            }
        };

        if !self.is_entry_fresh(modified) {
            debug!("Cache entry expired");
            return None;
        }

        match Self::read_entry(&path) {
            Ok(dataset) => {
                debug!(rows = dataset.height(), "Cache hit");
                Some(dataset)
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to load cache entry");
                None
            }
        }
    }

    #[instrument(skip(self, dataset), fields(key = %key, rows = dataset.height()))]
    async fn put(&self, dataset: &Dataset, key: &RequestKey) -> bool {
        let path = self.entry_path(key);
        match self.write_entry(&path, dataset) {
            Ok(()) => {
                debug!(path = %path.display(), "Cached dataset");
                true
            }
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to save cache entry");
                false
            }
        }
    }

    #[instrument(skip(self))]
    async fn purge_expired(&self) -> usize {
        let expired = self.entries().into_iter().filter(|path| match modified(path) {
            Ok(modified) => !self.is_entry_fresh(modified),
            Err(e) => {
                warn!(error = %e, path = %path.display(), "Failed to stat cache entry");
                false
            }
        });
        let removed = Self::remove_all(expired);
        if removed > 0 {
            debug!("Removed {} expired cache entries", removed);
        }
        removed
    }

    #[instrument(skip(self))]
    async fn purge_all(&self) -> usize {
        let removed = Self::remove_all(self.entries());
        debug!("Removed {} cache entries", removed);
        removed
    }

    #[instrument(skip(self))]
    async fn stats(&self) -> CacheStats {
        let mut stats = CacheStats {
            location: Some(self.config.directory.clone()),
            ..Default::default()
        };

        for path in self.entries() {
            let metadata = match fs::metadata(&path) {
                Ok(metadata) => metadata,
                Err(e) => {
                    warn!(error = %e, path = %path.display(), "Failed to stat cache entry");
                    continue;
                }
            };
            stats.total += 1;
            stats.total_size += metadata.len();
            match metadata.modified() {
                Ok(modified) if self.is_entry_fresh(modified) => stats.valid += 1,
                _ => stats.expired += 1,
            }
        }

        stats
    }
}
