//! Retry with exponential backoff.
//!
//! Attempts are strictly sequential. After failed attempt `a` the helper
//! sleeps `base_delay * 2^(a-1)` (no jitter) unless it was the last one, in
//! which case the last error is returned unchanged.

use crate::result::{ProbeError, ProbeResult};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

/// Default attempts per operation
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default delay after the first failure
pub const DEFAULT_BASE_DELAY_MS: u64 = 1_000;

/// Retry policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: Duration::from_millis(DEFAULT_BASE_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` must be at least 1
    pub fn new(max_attempts: u32, base_delay: Duration) -> ProbeResult<Self> {
        if max_attempts == 0 {
            return Err(ProbeError::InvalidArgument {
                message: "retry policy needs at least one attempt".to_string(),
            });
        }
        Ok(Self {
            max_attempts,
            base_delay,
        })
    }

    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub const fn base_delay(&self) -> Duration {
        self.base_delay
    }

    /// Sleep after failed attempt `attempt` (1-based); saturates on overflow
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let factor = 1u32
            .checked_shl(attempt.saturating_sub(1))
            .unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }
}

/// Run `operation` until it succeeds or the policy's attempts are used up.
///
/// Returns the first success, or the error of the final attempt.
pub async fn retry<T, E, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Display,
{
    let mut attempt = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt >= policy.max_attempts => {
                tracing::warn!(attempt, error = %err, "giving up after final attempt");
                return Err(err);
            }
            Err(err) => {
                let delay = policy.delay_after(attempt);
                tracing::debug!(
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    error = %err,
                    "attempt failed, backing off"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
