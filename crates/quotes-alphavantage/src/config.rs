//! Client configuration.

use quotes_core::{QuoteError, Result};
use std::fmt;
use std::time::Duration;

use crate::retry::RetryPolicy;

/// Alpha Vantage query endpoint.
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Per-attempt transport timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Value shipped in example `.env` files; never a usable key.
pub const PLACEHOLDER_API_KEY: &str = "your_api_key_here";

/// Settings for an [`AlphaVantageClient`](crate::AlphaVantageClient).
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Upstream API key.
    pub api_key: String,
    /// Query endpoint.
    pub base_url: String,
    /// Timeout applied to each request attempt.
    pub timeout: Duration,
    /// Retry behavior for transient transport failures.
    pub retry: RetryPolicy,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ClientConfig {
    /// Create a config with the given API key and default settings.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    /// Sets the query endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the per-attempt timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Checks that the API key is present and not the placeholder.
    ///
    /// # Errors
    /// Returns [`QuoteError::Configuration`] for a blank or placeholder key.
    pub fn validate(&self) -> Result<()> {
        let key = self.api_key.trim();
        if key.is_empty() || key == PLACEHOLDER_API_KEY {
            return Err(QuoteError::Configuration(
                "Alpha Vantage API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("demo");
        assert_eq!(config.base_url, ALPHA_VANTAGE_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.retry, RetryPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_missing_and_placeholder_keys() {
        for key in ["", "   ", PLACEHOLDER_API_KEY] {
            let err = ClientConfig::new(key).validate().unwrap_err();
            assert!(
                matches!(err, QuoteError::Configuration(ref msg) if msg.contains("not configured"))
            );
        }
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ClientConfig::new("secret_key_12345");
        let debug_str = format!("{:?}", config);
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("[REDACTED]"));
    }
}
