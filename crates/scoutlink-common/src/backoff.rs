//! Bounded exponential retry backoff
//!
//! Used for the membership portal, which rate-limits with HTTP 429, and for
//! Discord REST calls. Delay doubles per attempt from the base delay; after
//! the attempt cap the last error is returned as-is.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

/// Retry policy for [`retry_with_backoff`]
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    /// Delay before the first retry; doubles on each subsequent retry
    pub base_delay: Duration,
    /// Total attempts including the first (must be at least 1)
    pub max_attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: Duration::from_millis(500),
            max_attempts: 8,
        }
    }
}

impl BackoffPolicy {
    /// Delay to sleep after the given zero-based failed attempt
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2_u32.saturating_pow(attempt)
    }
}

/// Run `op` until it succeeds, the error stops being retryable, or the
/// attempt cap is reached
///
/// `should_retry` decides per error whether another attempt is worthwhile
/// (e.g. only on an HTTP 429 response).
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: BackoffPolicy,
    mut should_retry: impl FnMut(&E) -> bool,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt + 1 < max_attempts && should_retry(&err) => {
                let delay = policy.delay_for(attempt);
                debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying after backoff");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
