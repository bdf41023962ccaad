//! HTTP transport for the messaging platform.
//!
//! One JSON POST per call, with a fixed per-request timeout. Any non-success
//! status is classified as a [`DeliveryError`] carrying the response body for
//! diagnostics. Retry is the caller's responsibility, not this layer's.

use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

/// Fixed per-request timeout for all outbound calls.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// A failed outbound send. Timeouts and connection errors surface as `Http`
/// and are retried identically to rejected requests.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("endpoint returned {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Shared HTTP client for outbound sends. Immutable after construction and
/// safe for concurrent use across tasks.
#[derive(Debug, Clone)]
pub struct Transport {
    client: reqwest::Client,
}

impl Transport {
    pub fn new() -> Result<Self, DeliveryError> {
        Self::with_timeout(REQUEST_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// POSTs `payload` as JSON to `url`.
    pub async fn post(&self, url: &str, payload: &Value) -> Result<(), DeliveryError> {
        debug!(%url, "posting notification");
        let response = self.client.post(url).json(payload).send().await?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "notification accepted");
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body = %body, "notification rejected");
            Err(DeliveryError::Status { status, body })
        }
    }
}
