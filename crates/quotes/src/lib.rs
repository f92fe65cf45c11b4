#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quotes-rs/quotes/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Cached stock time series from Alpha Vantage.
//!
//! This crate re-exports the core types, the cache stores and the client, and
//! provides [`QuotesConfig`] for wiring them together from the environment.
//!
//! # Example
//!
//! ```rust,ignore
//! use quotes::{OutputSize, QuotesConfig};
//!
//! #[tokio::main]
//! async fn main() -> quotes::Result<()> {
//!     let client = QuotesConfig::from_env()?.build_client()?;
//!
//!     let daily = client.get_daily("AAPL", false, OutputSize::Compact).await?;
//!     println!("{:?}", daily.frame());
//!
//!     Ok(())
//! }
//! ```

// Core types and traits
pub use quotes_core::*;

// Cache implementations
pub use quotes_cache::{CacheConfig, InMemoryCache, NoopCache, ParquetCache};

// Client
pub use quotes_alphavantage::{AlphaVantageClient, ClientConfig, RetryPolicy};

mod config;
pub use config::{
    API_KEY_VAR, BASE_URL_VAR, CACHE_DIR_VAR, CACHE_TTL_HOURS_VAR, QuotesConfig,
};
