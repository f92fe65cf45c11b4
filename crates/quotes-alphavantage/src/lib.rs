#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quotes-rs/quotes/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Alpha Vantage time series client.
//!
//! # Usage
//!
//! ```rust,ignore
//! use quotes_alphavantage::{AlphaVantageClient, ClientConfig};
//! use quotes_cache::{CacheConfig, ParquetCache};
//! use quotes_core::OutputSize;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = AlphaVantageClient::new(
//!         ClientConfig::new("your_api_key"),
//!         Arc::new(ParquetCache::new(CacheConfig::default())),
//!     )?;
//!
//!     let daily = client.get_daily("AAPL", true, OutputSize::Compact).await?;
//!     println!("{:?}", daily.frame());
//!
//!     Ok(())
//! }
//! ```

/// Alpha Vantage client.
pub mod client;
/// Client configuration.
pub mod config;
/// Payload classification and parsing.
pub mod response;
/// Retry policy.
pub mod retry;
/// HTTP transport seam.
pub mod transport;

pub use client::AlphaVantageClient;
pub use config::{ALPHA_VANTAGE_BASE_URL, ClientConfig, DEFAULT_TIMEOUT, PLACEHOLDER_API_KEY};
pub use response::parse_response;
pub use retry::RetryPolicy;
pub use transport::{HttpTransport, Transport, TransportError};
