use std::future::Future;
use std::time::Duration;
use crate::shared::constants::{ERROR_RETRY_DELAY_MS, MAX_RETRY_ATTEMPTS};
use crate::shared::types::StoreResult;

/// How often transient store failures are retried
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(MAX_RETRY_ATTEMPTS, Duration::from_millis(ERROR_RETRY_DELAY_MS))
    }
}

/// Run a store operation, retrying only `IoFailure`
pub async fn with_io_retry<T, F, Fut>(policy: &RetryPolicy, operation: &str, mut op: F) -> StoreResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = StoreResult<T>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Err(e) if e.is_transient() && attempt < policy.max_attempts => {
                log::warn!(
                    "{} failed (attempt {}/{}): {}; retrying",
                    operation, attempt, policy.max_attempts, e
                );
                attempt += 1;
                tokio::time::sleep(policy.delay).await;
            }
            result => return result,
        }
    }
}
