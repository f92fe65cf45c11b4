#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quotes-rs/quotes/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Caching implementations for the quotes pipeline.
//!
//! This crate provides implementations of the [`QuoteCache`] trait from `quotes-core`:
//!
//! - [`ParquetCache`] - Persistent one-file-per-request disk cache (the default)
//! - [`InMemoryCache`] - Simple in-memory cache for testing
//! - [`NoopCache`] - No-op cache that doesn't store anything

/// In-memory cache implementation.
pub mod memory;
/// No-op cache implementation.
pub mod noop;
/// Parquet-file cache implementation.
pub mod parquet;

// Re-export the trait for convenience
pub use quotes_core::QuoteCache;

// Re-export implementations
pub use memory::InMemoryCache;
pub use noop::NoopCache;
pub use parquet::{CacheConfig, DEFAULT_CACHE_DIR, DEFAULT_EXPIRATION, ParquetCache};
