//! Fixed-backoff retry with a recovery step between attempts.

use std::future::Future;
use std::time::Duration;

use crate::error::FetchError;

/// How many times to try an operation and how long to wait between tries.
///
/// Before every retry the caller-supplied recovery action runs (for fetches,
/// a cookie refresh), then the policy sleeps for `backoff`. Neither happens
/// after the final attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts the first try; values below 1 are raised to 1.
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn backoff(&self) -> Duration {
        self.backoff
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempt budget is spent.
    ///
    /// Exhausting the budget yields [`FetchError::RetryExhausted`] carrying
    /// `label` and the last attempt's error.
    pub async fn run<T, Op, OpFut, Rec, RecFut>(
        &self,
        label: &str,
        mut operation: Op,
        mut recover: Rec,
    ) -> Result<T, FetchError>
    where
        Op: FnMut() -> OpFut,
        OpFut: Future<Output = Result<T, FetchError>>,
        Rec: FnMut() -> RecFut,
        RecFut: Future<Output = ()>,
    {
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            if !err.is_retryable() {
                return Err(err);
            }
            if attempt >= self.max_attempts {
                return Err(FetchError::RetryExhausted {
                    index: label.to_string(),
                    attempts: attempt,
                    last: Box::new(err),
                });
            }
            tracing::warn!(
                "  {} (attempt {}/{}), refreshing session and retrying in {:.1}s",
                err,
                attempt,
                self.max_attempts,
                self.backoff.as_secs_f64()
            );
            recover().await;
            if !self.backoff.is_zero() {
                tokio::time::sleep(self.backoff).await;
            }
        }
    }
}
