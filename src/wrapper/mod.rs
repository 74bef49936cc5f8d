//! Retrying decorators around REST transports.
//!
//! Both wrappers run the same attempt loop:
//!
//! 1. Call the transport; a success is returned as is.
//! 2. A rate-limited failure (HTTP 429) is retried after its `Retry-After`
//!    delay, or [`DEFAULT_RATE_LIMIT_DELAY`](crate::http::DEFAULT_RATE_LIMIT_DELAY),
//!    until the rate-limit budget is spent.
//! 3. Any other failure is retried immediately until the generic budget is
//!    spent.
//! 4. Once the matching budget is spent, the failure is returned unchanged.
//!
//! The two budgets are counted separately, per call. The loop decisions live
//! in [`AttemptState`]; the wrappers only differ in how they call the
//! transport and how they pause.

mod blocking;
mod nonblocking;

use log::{debug, warn};
use std::time::Duration;

use crate::error::ApiError;
use crate::http::retry::{FailureKind, classify};
use crate::policy::RetryPolicy;

pub use blocking::RetryingRestWrapper;
pub use nonblocking::RetryingRestWrapperAsync;

/// Retry counters for a single `request` call.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AttemptState {
    retry_count: u32,
    rate_limit_retry_count: u32,
}

impl AttemptState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failed attempt.
    ///
    /// Returns the pause before the next attempt, or `None` when the budget
    /// for this kind of failure is spent and the failure is final.
    pub fn on_failure(&mut self, policy: &RetryPolicy, kind: FailureKind) -> Option<Duration> {
        match kind {
            FailureKind::RateLimited { .. } => {
                if self.rate_limit_retry_count >= policy.max_rate_limit_retries() {
                    return None;
                }
                self.rate_limit_retry_count += 1;
            }
            FailureKind::Generic => {
                if self.retry_count >= policy.max_retries() {
                    return None;
                }
                self.retry_count += 1;
            }
        }
        Some(kind.delay())
    }

    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    pub fn rate_limit_retry_count(&self) -> u32 {
        self.rate_limit_retry_count
    }

    fn attempts(&self) -> u32 {
        1 + self.retry_count + self.rate_limit_retry_count
    }
}

/// Classifies `error` and advances `state`, logging the outcome.
fn next_delay(state: &mut AttemptState, policy: &RetryPolicy, error: &ApiError) -> Option<Duration> {
    let kind = classify(error);
    let attempt = state.attempts();

    match state.on_failure(policy, kind) {
        Some(delay) => {
            let (used, budget) = match kind {
                FailureKind::RateLimited { .. } => {
                    (state.rate_limit_retry_count, policy.max_rate_limit_retries())
                }
                FailureKind::Generic => (state.retry_count, policy.max_retries()),
            };
            warn!(
                "Attempt {} failed ({}: {}), retry {}/{} in {}ms...",
                attempt,
                kind,
                error,
                used,
                budget,
                delay.as_millis()
            );
            Some(delay)
        }
        None => {
            debug!(
                "Attempt {} failed ({}: {}), no {} retries left",
                attempt, kind, error, kind
            );
            None
        }
    }
}
