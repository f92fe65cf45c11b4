//! Alpha Vantage client: cache lookup, retrying fetch, parse and write-back.

use quotes_core::{
    Dataset, Interval, OutputSize, QuoteCache, QuoteError, RequestKey, Result, TimeSeriesFunction,
};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::config::ClientConfig;
use crate::response::parse_response;
use crate::transport::{HttpTransport, Transport};

/// Client for the Alpha Vantage time series endpoints.
///
/// Every fetch consults the cache first; on a miss it queries the upstream,
/// retrying transient transport failures, and writes the parsed dataset back.
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    cache: Arc<dyn QuoteCache>,
}

impl AlphaVantageClient {
    /// Create a client that talks HTTP through `reqwest`.
    ///
    /// # Errors
    /// Returns [`QuoteError::Configuration`] if the API key is missing or the
    /// HTTP client cannot be built.
    pub fn new(config: ClientConfig, cache: Arc<dyn QuoteCache>) -> Result<Self> {
        config.validate()?;
        let transport = HttpTransport::new(config.timeout)
            .map_err(|e| QuoteError::Configuration(e.to_string()))?;
        Ok(Self {
            config,
            transport: Arc::new(transport),
            cache,
        })
    }

    /// Create a client with a custom transport.
    ///
    /// # Errors
    /// Returns [`QuoteError::Configuration`] if the API key is missing.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        cache: Arc<dyn QuoteCache>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            transport,
            cache,
        })
    }

    /// Returns the client configuration.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Returns the cache backing this client.
    #[must_use]
    pub fn cache(&self) -> &Arc<dyn QuoteCache> {
        &self.cache
    }

    /// Fetch a time series, serving it from the cache when fresh.
    ///
    /// # Errors
    /// - [`QuoteError::Configuration`] for an invalid symbol/interval combination
    /// - [`QuoteError::InvalidSymbol`] or [`QuoteError::RateLimited`] when the
    ///   upstream reports them
    /// - [`QuoteError::Network`] when the request fails after retries
    /// - [`QuoteError::MalformedResponse`] when the payload has no usable series
    pub async fn fetch(
        &self,
        symbol: &str,
        function: TimeSeriesFunction,
        interval: Option<Interval>,
        output_size: OutputSize,
    ) -> Result<Dataset> {
        let key = RequestKey::new(symbol, function, interval, output_size)?;
        self.fetch_key(&key).await
    }

    /// Fetch the time series described by an already validated key.
    ///
    /// # Errors
    /// Same as [`fetch`](Self::fetch), minus configuration errors.
    #[instrument(skip(self), fields(key = %key))]
    pub async fn fetch_key(&self, key: &RequestKey) -> Result<Dataset> {
        if let Some(dataset) = self.cache.get(key).await {
            debug!(rows = dataset.height(), "Using cached data");
            return Ok(dataset);
        }

        info!(
            symbol = %key.symbol(),
            function = %key.function(),
            "Fetching from Alpha Vantage"
        );
        let body = self.request(&self.query(key)).await?;
        let dataset = parse_response(&body, key.function())?;

        if self.cache.put(&dataset, key).await {
            debug!(rows = dataset.height(), "Data cached for future use");
        } else {
            warn!("Failed to cache fetched data");
        }
        Ok(dataset)
    }

    /// Daily bars, optionally split/dividend adjusted.
    ///
    /// # Errors
    /// See [`fetch`](Self::fetch).
    pub async fn get_daily(
        &self,
        symbol: &str,
        adjusted: bool,
        output_size: OutputSize,
    ) -> Result<Dataset> {
        let function = if adjusted {
            TimeSeriesFunction::DailyAdjusted
        } else {
            TimeSeriesFunction::Daily
        };
        self.fetch(symbol, function, None, output_size).await
    }

    /// Weekly bars, full history.
    ///
    /// # Errors
    /// See [`fetch`](Self::fetch).
    pub async fn get_weekly(&self, symbol: &str, adjusted: bool) -> Result<Dataset> {
        let function = if adjusted {
            TimeSeriesFunction::WeeklyAdjusted
        } else {
            TimeSeriesFunction::Weekly
        };
        self.fetch(symbol, function, None, OutputSize::Full).await
    }

    /// Monthly bars, full history.
    ///
    /// # Errors
    /// See [`fetch`](Self::fetch).
    pub async fn get_monthly(&self, symbol: &str, adjusted: bool) -> Result<Dataset> {
        let function = if adjusted {
            TimeSeriesFunction::MonthlyAdjusted
        } else {
            TimeSeriesFunction::Monthly
        };
        self.fetch(symbol, function, None, OutputSize::Full).await
    }

    /// Intraday bars at the given interval.
    ///
    /// # Errors
    /// See [`fetch`](Self::fetch).
    pub async fn get_intraday(
        &self,
        symbol: &str,
        interval: Interval,
        output_size: OutputSize,
    ) -> Result<Dataset> {
        self.fetch(
            symbol,
            TimeSeriesFunction::Intraday,
            Some(interval),
            output_size,
        )
        .await
    }

    fn query(&self, key: &RequestKey) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("function", key.function().as_str().to_string()),
            ("symbol", key.symbol().as_str().to_string()),
            ("outputsize", key.output_size().as_str().to_string()),
        ];
        if let Some(interval) = key.interval() {
            query.push(("interval", interval.as_str().to_string()));
        }
        query.push(("apikey", self.config.api_key.clone()));
        query
    }

    async fn request(&self, query: &[(&str, String)]) -> Result<String> {
        let policy = self.config.retry;
        let mut retry = 0;
        loop {
            match self.transport.get(&self.config.base_url, query).await {
                Ok(body) => return Ok(body),
                Err(err) if err.is_transient() && retry < policy.max_retries => {
                    let wait = policy.delay(retry);
                    retry += 1;
                    warn!(
                        error = %err,
                        attempt = retry,
                        max_retries = policy.max_retries,
                        "Request failed, retrying in {:?}",
                        wait
                    );
                    tokio::time::sleep(wait).await;
                }
                Err(err) if err.is_transient() => {
                    return Err(QuoteError::Network(format!(
                        "{err} after {} retries",
                        policy.max_retries
                    )));
                }
                Err(err) => return Err(QuoteError::Network(err.to_string())),
            }
        }
    }
}
