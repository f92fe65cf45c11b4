//! Process bootstrap from environment variables.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use quotes_alphavantage::{ALPHA_VANTAGE_BASE_URL, AlphaVantageClient, ClientConfig};
use quotes_cache::{CacheConfig, DEFAULT_CACHE_DIR, DEFAULT_EXPIRATION, NoopCache, ParquetCache};
use quotes_core::{QuoteCache, QuoteError, Result};
use tracing::debug;

/// Variable holding the Alpha Vantage API key.
pub const API_KEY_VAR: &str = "ALPHA_VANTAGE_API_KEY";
/// Variable overriding the cache directory.
pub const CACHE_DIR_VAR: &str = "QUOTES_CACHE_DIR";
/// Variable overriding the cache expiration, in whole hours.
pub const CACHE_TTL_HOURS_VAR: &str = "QUOTES_CACHE_TTL_HOURS";
/// Variable overriding the query endpoint.
pub const BASE_URL_VAR: &str = "QUOTES_BASE_URL";

const SECONDS_PER_HOUR: u64 = 60 * 60;

/// Everything needed to build a client and its cache.
#[derive(Clone, PartialEq, Eq)]
pub struct QuotesConfig {
    /// Alpha Vantage API key, if one was found.
    pub api_key: Option<String>,
    /// Query endpoint.
    pub base_url: String,
    /// Cache location and expiration.
    pub cache: CacheConfig,
    /// When false, the client runs against a [`NoopCache`].
    pub use_cache: bool,
}

impl std::fmt::Debug for QuotesConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotesConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("cache", &self.cache)
            .field("use_cache", &self.use_cache)
            .finish()
    }
}

impl Default for QuotesConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
            cache: CacheConfig::default(),
            use_cache: true,
        }
    }
}

impl QuotesConfig {
    /// Loads `.env` (if present) and reads settings from the process environment.
    ///
    /// # Errors
    /// Returns [`QuoteError::Configuration`] if a variable is set to an
    /// unusable value. A missing API key is only reported by
    /// [`build_client`](Self::build_client).
    pub fn from_env() -> Result<Self> {
        match dotenvy::dotenv() {
            Ok(path) => debug!(path = %path.display(), "Loaded .env file"),
            Err(e) => debug!(error = %e, "No .env file loaded"),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through `lookup`, treating blank values as unset.
    ///
    /// # Errors
    /// Returns [`QuoteError::Configuration`] if the cache TTL is not a
    /// positive whole number of hours.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let directory = var(CACHE_DIR_VAR)
            .map_or_else(|| PathBuf::from(DEFAULT_CACHE_DIR), PathBuf::from);
        let expiration = match var(CACHE_TTL_HOURS_VAR) {
            Some(raw) => parse_ttl_hours(&raw)?,
            None => DEFAULT_EXPIRATION,
        };

        Ok(Self {
            api_key: var(API_KEY_VAR).map(|k| k.trim().to_string()),
            base_url: var(BASE_URL_VAR).unwrap_or_else(|| ALPHA_VANTAGE_BASE_URL.to_string()),
            cache: CacheConfig::new(directory).with_expiration(expiration),
            use_cache: true,
        })
    }

    /// Disables or enables caching.
    #[must_use]
    pub const fn with_cache_enabled(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    /// Builds the cache store these settings describe.
    #[must_use]
    pub fn build_cache(&self) -> Arc<dyn QuoteCache> {
        if self.use_cache {
            Arc::new(ParquetCache::new(self.cache.clone()))
        } else {
            Arc::new(NoopCache::new())
        }
    }

    /// Builds a client over [`build_cache`](Self::build_cache).
    ///
    /// # Errors
    /// Returns [`QuoteError::Configuration`] if no usable API key is set.
    pub fn build_client(&self) -> Result<AlphaVantageClient> {
        let api_key = self.api_key.clone().ok_or_else(|| {
            QuoteError::Configuration(format!("{API_KEY_VAR} is not set"))
        })?;
        let config = ClientConfig::new(api_key).with_base_url(self.base_url.clone());
        AlphaVantageClient::new(config, self.build_cache())
    }
}

fn parse_ttl_hours(raw: &str) -> Result<Duration> {
    match raw.trim().parse::<u64>() {
        Ok(hours) if hours > 0 => Ok(Duration::from_secs(
            hours.saturating_mul(SECONDS_PER_HOUR),
        )),
        _ => Err(QuoteError::Configuration(format!(
            "{CACHE_TTL_HOURS_VAR} must be a positive number of hours, got {raw:?}"
        ))),
    }
}
