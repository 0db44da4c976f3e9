//! Retry supervisor: bounded re-execution of the whole workflow.
//!
//! The target is a third-party UI over a flaky network, so one failed
//! attempt says little. The supervisor re-runs the complete pipeline -- a
//! fresh session every time, no partial results carried over -- up to a
//! fixed attempt count with a fixed delay in between. No exponential
//! backoff, no jitter. Skip outcomes are `Ok` values and never retried.
//!
//! Expressed as an explicit bounded loop with an attempt counter; the last
//! error is the one surfaced after exhaustion.

use std::time::Duration;

// ---------------------------------------------------------------------------
// RetryPolicy
// ---------------------------------------------------------------------------

/// Default attempt bound.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default fixed delay between attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(5);

/// How many times to run the workflow and how long to pause in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Must be at least 1.
    pub max_attempts: u32,
    /// Fixed pause between consecutive attempts.
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

/// A successful supervised result plus how many attempts it took.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Supervised<T> {
    pub value: T,
    pub attempts: u32,
}

impl RetryPolicy {
    /// Run `op` until it succeeds or the attempt bound is hit.
    ///
    /// `op` receives the 1-based attempt number. Each invocation must be a
    /// full independent execution; the supervisor carries nothing between
    /// attempts except the count. After exhaustion the **last** error is
    /// returned.
    pub async fn supervise<T, E, F, Fut>(&self, label: &str, mut op: F) -> Result<Supervised<T>, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match op(attempt).await {
                Ok(value) => {
                    if attempt > 1 {
                        tracing::info!(attempt, "{label} succeeded after retrying");
                    }
                    return Ok(Supervised { value, attempts: attempt });
                }
                Err(err) if attempt < max_attempts => {
                    tracing::warn!(
                        attempt,
                        max_attempts,
                        error = %err,
                        delay = ?self.delay,
                        "{label} attempt failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    tracing::error!(
                        attempts = attempt,
                        error = %err,
                        "{label} failed, attempts exhausted"
                    );
                    return Err(err);
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
