//! Retry logic with exponential backoff
//!
//! Retries an async operation while it fails with a retryable error.
//! The delay before retry `n` (0-indexed) is
//! `min(initial_delay * multiplier^n, max_delay)`, optionally jittered.
//! Waits are cooperative and honour a [`CancellationToken`].
//!
//! # Example
//!
//! ```rust,ignore
//! use application::retry::{RetryConfig, with_retry};
//!
//! let config = RetryConfig::default();
//! let outcome = with_retry(&config, None, || async {
//!     inference.invoke(&request).await
//! }).await;
//! ```

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::cancellation::{CancellationToken, Cancelled};
use crate::error::ApplicationError;

/// Configuration for retry behavior with exponential backoff
///
/// Defaults: 500ms initial delay, doubling, capped at 4s, 3 retries, no jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub multiplier: f64,
    /// Retries after the first attempt
    pub max_retries: u32,
    pub jitter_enabled: bool,
    /// Maximum jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new(500, 4_000, 2.0, 3)
    }
}

impl RetryConfig {
    /// Create a new retry configuration with custom parameters, no jitter
    #[must_use]
    pub const fn new(
        initial_delay_ms: u64,
        max_delay_ms: u64,
        multiplier: f64,
        max_retries: u32,
    ) -> Self {
        Self {
            initial_delay_ms,
            max_delay_ms,
            multiplier,
            max_retries,
            jitter_enabled: false,
            jitter_factor: 0.1,
        }
    }

    /// Never retry
    #[must_use]
    pub const fn no_retries() -> Self {
        Self::new(0, 0, 1.0, 0)
    }

    /// Enable jitter with the given factor
    #[must_use]
    pub const fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter_enabled = true;
        self.jitter_factor = factor;
        self
    }

    /// Total attempts including the first one
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Calculate the delay for a given retry (0-indexed)
    ///
    /// Uses exponential backoff: delay = initial_delay * multiplier^attempt,
    /// capped at max_delay, with optional jitter.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_wrap,
        clippy::cast_sign_loss,
        clippy::cast_possible_truncation
    )]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let base_delay = (self.initial_delay_ms as f64) * self.multiplier.powi(exponent);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let final_delay = if self.jitter_enabled && capped_delay > 0.0 {
            let jitter_range = capped_delay * self.jitter_factor.clamp(0.0, 1.0);
            let jitter = rand::rng().random_range(-jitter_range..=jitter_range);
            (capped_delay + jitter).max(0.0)
        } else {
            capped_delay
        };

        // final_delay is capped and non-negative
        Duration::from_millis(final_delay as u64)
    }
}

/// Trait for errors that can be checked for retryability
pub trait Retryable {
    /// Returns true if this error is retryable
    fn is_retryable(&self) -> bool;
}

impl Retryable for ApplicationError {
    fn is_retryable(&self) -> bool {
        Self::is_retryable(self)
    }
}

/// Result of a retried operation plus how it got there
#[derive(Debug)]
pub struct RetryResult<T, E> {
    /// The result of the operation
    pub result: Result<T, E>,
    /// Number of attempts made (1 = no retries, 2 = one retry, etc.)
    pub attempts: u32,
    /// Backoff delays waited between attempts, in order
    pub delays: Vec<Duration>,
    /// Total time spent including retries
    pub total_duration: Duration,
}

async fn wait_for_cancel(cancel: Option<&CancellationToken>) {
    match cancel {
        Some(token) => token.cancelled().await,
        None => std::future::pending().await,
    }
}

/// Execute an async operation with retry logic
///
/// Non-retryable errors return immediately. Retryable errors are retried
/// until `config.max_retries` is used up, after which the last error is
/// returned. If `cancel` fires, the in-flight attempt or backoff wait is
/// dropped and the result is `Err(Cancelled.into())`.
#[allow(clippy::cast_possible_truncation)]
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    cancel: Option<&CancellationToken>,
    mut operation: F,
) -> RetryResult<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display + From<Cancelled>,
{
    let start = Instant::now();
    let mut attempts = 0u32;
    let mut delays = Vec::new();

    let finish = |result: Result<T, E>, attempts: u32, delays: Vec<Duration>| RetryResult {
        result,
        attempts,
        delays,
        total_duration: start.elapsed(),
    };

    loop {
        if cancel.is_some_and(CancellationToken::is_cancelled) {
            debug!(attempts, "Retry loop cancelled before attempt");
            return finish(Err(Cancelled.into()), attempts, delays);
        }

        attempts += 1;
        let result = tokio::select! {
            biased;
            () = wait_for_cancel(cancel) => {
                debug!(attempts, "Retry loop cancelled during attempt");
                return finish(Err(Cancelled.into()), attempts, delays);
            }
            result = operation() => result,
        };

        let err = match result {
            Ok(value) => {
                if attempts > 1 {
                    debug!(
                        attempts = attempts,
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Operation succeeded after retries"
                    );
                }
                return finish(Ok(value), attempts, delays);
            },
            Err(err) => err,
        };

        let retry_attempt = attempts - 1; // 0-indexed for delay calculation

        if !err.is_retryable() {
            debug!(
                attempts = attempts,
                error = %err,
                "Operation failed with non-retryable error"
            );
            return finish(Err(err), attempts, delays);
        }

        if retry_attempt >= config.max_retries {
            warn!(
                attempts = attempts,
                max_retries = config.max_retries,
                error = %err,
                "Operation failed after max retries"
            );
            return finish(Err(err), attempts, delays);
        }

        let delay = config.delay_for_attempt(retry_attempt);
        warn!(
            attempt = attempts,
            max_retries = config.max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Operation failed, retrying"
        );
        delays.push(delay);

        tokio::select! {
            biased;
            () = wait_for_cancel(cancel) => {
                debug!(attempts, "Retry loop cancelled during backoff");
                return finish(Err(Cancelled.into()), attempts, delays);
            }
            () = tokio::time::sleep(delay) => {}
        }
    }
}
