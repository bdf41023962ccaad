//! Bounded retry for outbound sends.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// How often and how quickly a failed send is retried. One policy is
/// resolved per category from `max_attempts`; the backoff delay is explicit
/// so tests and deployments can set a real delay without touching call
/// sites. The default retries immediately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first. Treated as 1 if 0.
    pub max_attempts: u32,
    /// Delay between consecutive attempts.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::ZERO,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            ..Self::default()
        }
    }
}

/// Runs `op` up to `policy.max_attempts` times, logging each failure with
/// the attempt number, and surfaces the last error after exhaustion.
pub async fn retry<F, Fut, T, E>(policy: &RetryPolicy, label: &str, mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) => {
                warn!(
                    endpoint = label,
                    attempt,
                    max_attempts,
                    error = %e,
                    "send attempt failed"
                );
                last_error = Some(e);
                if attempt < max_attempts && !policy.backoff.is_zero() {
                    sleep(policy.backoff).await;
                }
            }
        }
    }

    Err(last_error.expect("at least one attempt was made"))
}
