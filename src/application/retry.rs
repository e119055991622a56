//! Fixed-interval retry for fallible async steps.
//!
//! Only errors classified as retryable by [`Error::is_retryable`] are retried;
//! anything else propagates on the first occurrence.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Bounded, fixed-interval retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    interval: Duration,
}

impl RetryPolicy {
    /// `max_attempts` is clamped to at least one.
    #[must_use]
    pub fn new(max_attempts: u32, interval: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            interval,
        }
    }

    /// Single attempt, no waiting.
    #[must_use]
    pub const fn once() -> Self {
        Self {
            max_attempts: 1,
            interval: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Run `op`, returning `Ok(None)` once the attempt budget is exhausted on
    /// retryable errors. Callers treat `None` as "no action taken".
    pub async fn run<T, F, Fut>(&self, label: &str, op: F) -> Result<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.attempt(label, op).await {
            Ok(value) => Ok(Some(value)),
            Err(Exhausted(last)) if last.is_retryable() => {
                warn!(step = label, attempts = self.max_attempts, error = %last, "Giving up");
                Ok(None)
            }
            Err(Exhausted(fatal)) => Err(fatal),
        }
    }

    /// Run `op`, re-raising the last error once the attempt budget is exhausted.
    pub async fn run_or_raise<T, F, Fut>(&self, label: &str, op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.attempt(label, op).await.map_err(|Exhausted(last)| last)
    }

    async fn attempt<T, F, Fut>(&self, label: &str, mut op: F) -> std::result::Result<T, Exhausted>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(Exhausted(err)),
                Err(err) if attempt >= self.max_attempts => return Err(Exhausted(err)),
                Err(err) => {
                    debug!(step = label, attempt, error = %err, "Retrying");
                    tokio::time::sleep(self.interval).await;
                    attempt += 1;
                }
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(2, Duration::from_secs(10))
    }
}

struct Exhausted(Error);
