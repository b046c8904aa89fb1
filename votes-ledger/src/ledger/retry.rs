//! Bounded retry of store transactions that abort on conflict.
use std::future::Future;
use std::time::Duration;

use tokio_retry::{
    RetryIf,
    strategy::{ExponentialBackoff, jitter},
};
use tracing::warn;
use votes_repository::VoteStoreError;

/// How often and how patiently a conflicting store transaction is retried.
///
/// Only `VoteStoreError::Conflict` is retried. Any other error, and any
/// business outcome such as a reached quota, is returned immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt. Zero disables retrying.
    pub max_retries: usize,
    /// Base of the exponential backoff, in milliseconds.
    pub base_delay_ms: u64,
    /// Upper bound for a single backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_ms: 10,
            max_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// Default backoff with a custom retry budget.
    pub fn with_max_retries(max_retries: usize) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    /// Runs `action` until it succeeds, fails with a non-conflict error, or
    /// the retry budget is spent.
    pub(crate) async fn run<T, A, F>(
        &self,
        operation: &'static str,
        action: A,
    ) -> Result<T, VoteStoreError>
    where
        A: FnMut() -> F,
        F: Future<Output = Result<T, VoteStoreError>>,
    {
        let strategy = ExponentialBackoff::from_millis(self.base_delay_ms)
            .factor(2)
            .max_delay(self.max_delay)
            .map(jitter)
            .take(self.max_retries);

        RetryIf::spawn(strategy, action, |err: &VoteStoreError| {
            let retryable = err.is_retryable();
            if retryable {
                warn!(operation, error = %err, "Store transaction conflict");
            }
            retryable
        })
        .await
    }
}
