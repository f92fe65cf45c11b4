//! Error types for quote operations.
//!
//! This module defines [`QuoteError`], the closed set of failures a caller of
//! the fetch pipeline can observe. Cache-layer failures have no variant here:
//! caches degrade to a miss or a skipped write and log instead.

use thiserror::Error;

/// Errors that can occur while fetching and parsing a time series.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QuoteError {
    /// The upstream rejected the symbol/function combination.
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),

    /// The upstream quota is exhausted.
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// The request could not be completed at the transport level.
    #[error("Network error: {0}")]
    Network(String),

    /// The upstream answered, but not with a usable time series.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// The request or client configuration is invalid.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl QuoteError {
    /// Returns true for failures caused by the upstream quota.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited(_))
    }
}

/// Result type alias using [`QuoteError`].
pub type Result<T> = std::result::Result<T, QuoteError>;
