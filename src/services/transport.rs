//! HTTP transport used by the metadata client.
//!
//! The client only needs "GET this URL as JSON within a deadline", so that is
//! all the trait exposes. Tests swap in scripted fakes.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Failure of a single request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("request timed out")]
    Timeout,

    #[error("Status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("invalid JSON body: {0}")]
    Decode(String),
}

impl TransportError {
    /// Whether another attempt may succeed.
    ///
    /// Timeouts, connection failures, 408, 429 and 5xx are retried; other
    /// statuses and undecodable bodies are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Timeout | TransportError::Network(_) => true,
            TransportError::Status(status) => {
                *status == 408 || *status == 429 || (500..=599).contains(status)
            }
            TransportError::Decode(_) => false,
        }
    }
}

/// Fetches JSON documents over HTTP.
#[async_trait]
pub trait Transport: Send + Sync {
    /// GET `url` and decode the body as JSON, giving up after `timeout`.
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, TransportError>;
}

/// `reqwest`-backed transport.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a new transport with a fresh connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport sharing an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TransportError::Timeout
        } else if err.is_decode() {
            TransportError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get_json(&self, url: &str, timeout: Duration) -> Result<Value, TransportError> {
        let request = async {
            let resp = self.client.get(url).send().await?;
            let status = resp.status();
            if !status.is_success() {
                return Err(TransportError::Status(status.as_u16()));
            }
            let body = resp.json::<Value>().await?;
            Ok::<Value, TransportError>(body)
        };

        // Deadline covers connect, headers and body.
        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout),
        }
    }
}
