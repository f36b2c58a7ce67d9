//! Retry with per-attempt timeout and capped exponential backoff.

use super::client::ObjectStoreError;
use crate::config::ObjectStoreSettings;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
    pub attempt_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
            attempt_timeout: Duration::from_secs(10),
        }
    }
}

impl From<&ObjectStoreSettings> for RetryPolicy {
    fn from(settings: &ObjectStoreSettings) -> Self {
        Self {
            max_attempts: settings.max_attempts,
            initial_backoff: Duration::from_millis(settings.initial_backoff_ms),
            max_backoff: Duration::from_millis(settings.max_backoff_ms),
            attempt_timeout: Duration::from_secs(settings.timeout_secs),
        }
    }
}

impl RetryPolicy {
    /// Policy that tries exactly once.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    fn backoff_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.initial_backoff
            .checked_mul(factor)
            .unwrap_or(self.max_backoff)
            .min(self.max_backoff)
    }

    /// Run `op` until it succeeds, fails permanently, or runs out of attempts.
    pub async fn run<T, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T, ObjectStoreError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ObjectStoreError>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = match tokio::time::timeout(self.attempt_timeout, op()).await {
                Ok(result) => result,
                Err(_) => Err(ObjectStoreError::Timeout(self.attempt_timeout)),
            };

            let err = match outcome {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_transient() {
                debug!(operation = op_name, attempt, error = %err, "Permanent object store failure");
                return Err(err);
            }
            if attempt >= attempts {
                warn!(operation = op_name, attempts, error = %err, "Object store retries exhausted");
                return Err(ObjectStoreError::RetriesExhausted {
                    attempts,
                    last: Box::new(err),
                });
            }

            let delay = self.backoff_for(attempt - 1);
            debug!(
                operation = op_name,
                attempt,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "Retrying object store call"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
