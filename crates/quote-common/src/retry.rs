//! Bounded retry with backoff.
//!
//! Callers of the folio sequencer, the client registry, and the document
//! renderer wrap those port calls in a `RetryPolicy`. Only transient
//! failures are retried; every other error class propagates immediately.

use std::future::Future;
use std::time::Duration;

use crate::error::{QuoteError, QuoteResult};

/// Bounded retry policy with exponential backoff.
#[derive(Clone, Copy, Debug)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(25),
        }
    }
}

impl RetryPolicy {
    /// Run `op` until it succeeds, fails non-transiently, or the attempt
    /// budget is exhausted.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> QuoteResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = QuoteResult<T>>,
    {
        let mut delay = self.base_delay;
        let mut attempt = 1u32;

        loop {
            match op().await {
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    tracing::debug!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, backing off"
                    );
                    tokio::time::sleep(delay).await;
                    delay *= 2;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn recovers_within_budget() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(1),
        };

        let result = policy
            .run(|| async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(QuoteError::Transient("backend down".into()))
                } else {
                    Ok(42)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn surfaces_transient_after_exhaustion() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_delay: Duration::from_millis(1),
        };

        let result: QuoteResult<()> = policy
            .run(|| async { Err(QuoteError::Transient("still down".into())) })
            .await;

        assert!(matches!(result, Err(QuoteError::Transient(_))));
    }

    #[tokio::test]
    async fn does_not_retry_permanent_failures() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::default();

        let result: QuoteResult<()> = policy
            .run(|| async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(QuoteError::AccessDenied)
            })
            .await;

        assert!(matches!(result, Err(QuoteError::AccessDenied)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
