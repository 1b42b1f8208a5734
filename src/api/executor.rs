//! Resilient call executor: retry policy plus failure classification.
//!
//! Every command routes its API calls through [`execute`], which wraps a
//! single-request operation with bounded retries and returns an explicit
//! [`CallOutcome`]. Classification of the raw error into a [`Failure`]
//! happens exactly once per attempt and never depends on retry state.

use crate::error::{ApiError, Failure};
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::sleep;

/// Result of executing an operation through the retry loop.
///
/// Success carries the operation's payload; failure carries the classified
/// `Failure` for the last attempt. Callers must branch on both arms.
pub type CallOutcome<T> = Result<T, Failure>;

/// Bounded retry policy for API requests.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Upper bound on total attempts, including the initial request.
    pub max_attempts: u32,
    /// Base delay used for exponential backoff.
    pub base_delay: Duration,
    /// Growth factor applied to the delay after each failed attempt.
    pub backoff_multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    /// Decide whether another attempt should be scheduled after `attempt`
    /// (1-based) failed with `failure`.
    fn should_retry(&self, failure: &Failure, attempt: u32) -> bool {
        failure.category.is_retryable() && attempt < self.max_attempts
    }

    /// Compute the wait before the next attempt, respecting a server-provided
    /// `Retry-After` hint verbatim when present.
    fn delay_for(&self, failure: &Failure, attempt: u32) -> Duration {
        if let Some(seconds) = failure.retry_after_secs {
            return Duration::from_secs(seconds);
        }
        let factor = self.backoff_multiplier.powi(attempt.saturating_sub(1) as i32);
        self.base_delay.mul_f64(factor)
    }
}

/// Execute `operation` under `policy` and return an explicit outcome.
///
/// `operation` must perform exactly one network request per invocation.
/// Non-retryable failures (auth, not-found, validation, unknown) surface on
/// first occurrence regardless of `max_attempts`; retryable failures
/// (rate-limited, server error, transport) are re-attempted with backoff
/// until the attempt budget is spent.
pub async fn execute<T, F, Fut>(mut operation: F, policy: &RetryPolicy) -> CallOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt: u32 = 1;
    loop {
        match operation().await {
            Ok(payload) => return Ok(payload),
            Err(err) => {
                let failure = Failure::from(err);
                if !policy.should_retry(&failure, attempt) {
                    return Err(failure);
                }
                let delay = policy.delay_for(&failure, attempt);
                tracing::debug!(
                    category = failure.category.label(),
                    attempt,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after failure"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// Like [`execute`], but a cancellation signal observed while waiting between
/// attempts aborts the loop with `FailureCategory::Cancelled` instead of
/// silently finishing the backoff.
pub async fn execute_with_cancel<T, F, Fut>(
    mut operation: F,
    policy: &RetryPolicy,
    cancel: &mut watch::Receiver<bool>,
) -> CallOutcome<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ApiError>>,
{
    let mut attempt: u32 = 1;
    loop {
        if *cancel.borrow() {
            return Err(Failure::cancelled());
        }
        match operation().await {
            Ok(payload) => return Ok(payload),
            Err(err) => {
                let failure = Failure::from(err);
                if !policy.should_retry(&failure, attempt) {
                    return Err(failure);
                }
                let delay = policy.delay_for(&failure, attempt);
                tracing::debug!(
                    category = failure.category.label(),
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying after failure"
                );
                tokio::select! {
                    _ = sleep(delay) => {}
                    changed = cancel.changed() => {
                        if changed.is_err() || *cancel.borrow() {
                            return Err(Failure::cancelled());
                        }
                    }
                }
                attempt += 1;
            }
        }
    }
}
