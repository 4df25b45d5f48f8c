//! Retry policy with a two-step backoff schedule.

use std::future::Future;
use std::time::Duration;

/// How many times to retry and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub retries: u32,
    /// Delay after the first failure.
    pub first_backoff: Duration,
    /// Delay after every later failure.
    pub backoff: Duration,
}

/// Why a retried operation gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryFailure<E> {
    /// Error from the last attempt.
    pub error: E,
    /// Attempts made, including the last one.
    pub attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            first_backoff: Duration::from_millis(500),
            backoff: Duration::from_millis(2_000),
        }
    }
}

impl RetryPolicy {
    /// Policy that never retries.
    pub fn none() -> Self {
        Self {
            retries: 0,
            ..Default::default()
        }
    }

    /// Total attempts allowed.
    pub fn max_attempts(&self) -> u32 {
        self.retries.saturating_add(1)
    }

    /// Delay before attempt `attempt + 1`, after attempt `attempt` (0-based) failed.
    /// `None` once the budget is spent.
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.retries {
            None
        } else if attempt == 0 {
            Some(self.first_backoff)
        } else {
            Some(self.backoff)
        }
    }

    /// Run `op` until it succeeds, fails with a non-retryable error, or the
    /// budget is spent. `op` receives the 0-based attempt number.
    pub async fn run<T, E, F, Fut, R>(&self, mut op: F, is_retryable: R) -> Result<T, RetryFailure<E>>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        R: Fn(&E) -> bool,
    {
        let mut attempt = 0;
        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    let delay = if is_retryable(&error) {
                        self.delay_after(attempt)
                    } else {
                        None
                    };
                    match delay {
                        Some(delay) => {
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        None => {
                            return Err(RetryFailure {
                                error,
                                attempts: attempt + 1,
                            })
                        }
                    }
                }
            }
        }
    }
}
