//! Retry execution with exponential backoff and jitter.
//!
//! Every outbound provider call goes through [`retry_with_backoff`]. Each
//! pipeline invocation gets its own backoff clock: the sleep suspends only
//! the calling task, so concurrent encounters retry independently.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use thiserror::Error;

/// Backoff parameters for one class of outbound call. Immutable per call.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Retries after the first attempt; total attempts = `max_retries + 1`.
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 1_000,
            max_delay_ms: 10_000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Generous profile for bulk transcription uploads.
    pub fn bulk_transcription() -> Self {
        Self::default()
    }

    /// Tight profile for interactive calls (note generation, live paths).
    pub fn interactive() -> Self {
        Self {
            max_retries: 2,
            initial_delay_ms: 250,
            max_delay_ms: 2_000,
            backoff_multiplier: 2.0,
        }
    }
}

/// Failure of an outbound provider call.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("provider returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    /// Terminal failures that must never be retried, regardless of what a
    /// status-code heuristic would say: malformed requests, caller aborts.
    #[error("non-retryable provider error: {0}")]
    NonRetryable(String),
}

impl ProviderError {
    /// Retryability classification: 429 and 5xx statuses, connectivity
    /// failures, and timeouts are transient; everything else is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Status { status, body } => {
                *status == 429
                    || (500..=599).contains(status)
                    || message_indicates_timeout(body)
            }
            Self::Network(_) | Self::Timeout(_) => true,
            Self::NonRetryable(_) => false,
        }
    }

    /// Map a reqwest transport error into the taxonomy.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() || err.is_request() {
            Self::Network(err.to_string())
        } else {
            Self::NonRetryable(err.to_string())
        }
    }
}

fn message_indicates_timeout(message: &str) -> bool {
    let lower = message.to_lowercase();
    lower.contains("timeout") || lower.contains("timed out")
}

/// Delay before retry `attempt` (0-indexed): exponential term plus uniform
/// jitter in `[0, 0.3 * base)`, the sum capped at `max_delay_ms`.
pub fn compute_backoff_delay(config: &RetryConfig, attempt: u32) -> Duration {
    let base = config.initial_delay_ms as f64 * config.backoff_multiplier.powi(attempt as i32);
    let jitter = rand::thread_rng().gen_range(0.0..0.3) * base;
    let delay_ms = (base + jitter).min(config.max_delay_ms as f64);
    Duration::from_millis(delay_ms as u64)
}

/// Execute `op`, retrying transient failures with exponential backoff.
///
/// `name` is for logging only. Returns the first success, or the last error
/// once the error is terminal or attempts are exhausted.
pub async fn retry_with_backoff<T, F, Fut>(
    name: &str,
    config: &RetryConfig,
    mut op: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < config.max_retries => {
                let delay = compute_backoff_delay(config, attempt);
                tracing::warn!(
                    operation = name,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "transient failure, backing off before retry"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => {
                tracing::error!(
                    operation = name,
                    attempts = attempt + 1,
                    error = %err,
                    "operation failed"
                );
                return Err(err);
            }
        }
    }
}
