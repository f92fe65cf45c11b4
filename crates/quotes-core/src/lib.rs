#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quotes-rs/quotes/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core types and traits for the quotes pipeline.
//!
//! This crate provides the pieces shared by the cache stores and the data
//! client:
//!
//! - [`RequestKey`](types::RequestKey) - A validated query and its cache key
//! - [`Dataset`](dataset::Dataset) - Parsed, time-indexed result
//! - [`QuoteCache`](cache::QuoteCache) - Caching abstraction
//! - [`QuoteError`](error::QuoteError) - Classified failures
//! - [`Clock`](clock::Clock) - Time source for freshness checks

/// Cache trait and stats for storing fetched datasets.
pub mod cache;
/// Time sources and the freshness rule.
pub mod clock;
/// Time-indexed dataset type.
pub mod dataset;
/// Error types for quote operations.
pub mod error;
/// Request types (Symbol, TimeSeriesFunction, RequestKey, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use cache::{CacheStats, QuoteCache};
pub use clock::{Clock, ManualClock, SystemClock, is_fresh};
pub use dataset::{Dataset, INDEX_COLUMN};
pub use error::{QuoteError, Result};
pub use types::{Interval, OutputSize, RequestKey, Symbol, TimeSeriesFunction};
