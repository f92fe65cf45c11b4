//! HTTP transport seam.

use async_trait::async_trait;
use reqwest::Client;
use std::fmt::Debug;
use std::time::Duration;
use thiserror::Error;

/// Transport-level failure of a single request attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The attempt exceeded its timeout.
    #[error("request timed out")]
    Timeout,

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    Connect(String),

    /// The upstream answered with a non-success HTTP status.
    #[error("HTTP {0}")]
    Status(u16),

    /// Any other failure, including body read errors.
    #[error("request failed: {0}")]
    Other(String),
}

impl TransportError {
    /// Returns true for failures worth retrying (timeouts and connection errors).
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Timeout | Self::Connect(_))
    }
}

/// Performs a GET request and returns the response body.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    /// Sends `GET url?query` and returns the body text of a success response.
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, TransportError>;
}

/// [`Transport`] backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport whose requests time out after `timeout`.
    ///
    /// # Errors
    /// Returns [`TransportError::Other`] if the HTTP client cannot be built.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;
        Ok(Self { client })
    }

    /// Create a transport from an existing client.
    #[must_use]
    pub const fn with_client(client: Client) -> Self {
        Self { client }
    }
}

// The query carries the API key, so URLs are stripped from reqwest errors.
fn map_error(err: reqwest::Error) -> TransportError {
    let err = err.without_url();
    if err.is_timeout() {
        TransportError::Timeout
    } else if err.is_connect() {
        TransportError::Connect(err.to_string())
    } else {
        TransportError::Other(err.to_string())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String, TransportError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(map_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        response.text().await.map_err(map_error)
    }
}
