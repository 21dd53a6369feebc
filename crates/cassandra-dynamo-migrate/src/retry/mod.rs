//! Bounded exponential-backoff retry around externally-facing operations.
//!
//! Every call the orchestrator makes against a store (connect, read, write)
//! goes through [`RetryExecutor::execute`]. Failures are logged and retried
//! until the operation succeeds or the policy's attempt budget is spent, at
//! which point the last error is wrapped in
//! [`MigrateError::RetryExhausted`].
//!
//! ```text
//! Attempt    Wait before next (base=2, unit=1s)
//! ───────────────────────────────────────────
//!    0           1s
//!    1           2s
//!    2           4s
//!    3           8s
//!    4          16s
//!    5        (give up, max_retries=5)
//! ```

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, warn};

use crate::error::{MigrateError, Result, Stage};

/// Attempt bound plus backoff schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_retries: u32,
    backoff_base: u32,
    backoff_unit: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5, 2, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_base: u32, backoff_unit: Duration) -> Self {
        Self {
            max_retries,
            backoff_base,
            backoff_unit,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Total invocations allowed: the first attempt plus every retry.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait after the failed attempt `attempt` (0-based): `unit * base^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = self.backoff_base.saturating_pow(attempt);
        self.backoff_unit.saturating_mul(factor)
    }
}

/// Suspends the caller between attempts.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Decides whether a failed attempt may be retried.
pub type RetryPredicate = Arc<dyn Fn(&MigrateError) -> bool + Send + Sync>;

/// Default classification: every error is treated as transient.
pub fn retry_all(_err: &MigrateError) -> bool {
    true
}

/// Runs fallible operations under a [`RetryPolicy`].
///
/// The executor is sequential: one attempt at a time, with the backoff wait
/// as its only suspension point.
#[derive(Clone)]
pub struct RetryExecutor {
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
    is_retriable: RetryPredicate,
}

impl RetryExecutor {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            sleeper: Arc::new(TokioSleeper),
            is_retriable: Arc::new(retry_all),
        }
    }

    /// Replace the backoff sleeper.
    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    /// Replace the error classification point.
    ///
    /// Errors for which the predicate returns `false` are not retried.
    pub fn with_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&MigrateError) -> bool + Send + Sync + 'static,
    {
        self.is_retriable = Arc::new(predicate);
        self
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Run `operation` until it succeeds or the attempt budget is spent.
    ///
    /// Returns the operation's value, or `RetryExhausted` wrapping the last
    /// failure and the number of attempts made.
    pub async fn execute<T, F, Fut>(&self, stage: Stage, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let max_attempts = self.policy.max_attempts();
        let mut attempt: u32 = 0;

        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };
            let made = attempt + 1;

            if !(self.is_retriable)(&err) {
                error!(
                    "{} failed on attempt {}/{} with a non-retriable error: {}",
                    stage, made, max_attempts, err
                );
                return Err(MigrateError::retry_exhausted(stage, made, err));
            }

            if made >= max_attempts {
                error!(
                    "{} failed on attempt {}/{}, giving up: {}",
                    stage, made, max_attempts, err
                );
                return Err(MigrateError::retry_exhausted(stage, made, err));
            }

            let wait = self.policy.backoff(attempt);
            warn!(
                "{} failed on attempt {}/{}: {}; retrying in {:?}",
                stage, made, max_attempts, err, wait
            );
            self.sleeper.sleep(wait).await;
            attempt = made;
        }
    }
}
