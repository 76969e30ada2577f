use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::FetchError;

/// How many times to try, how long to wait in between, and which errors are
/// worth another attempt.
#[derive(Debug)]
pub struct RetryPolicy<E> {
    pub max_attempts: u32,
    /// Multiplier for the exponential wait: attempt `n` waits `base * 2^(n-1)`.
    pub base_delay: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub retry_if: fn(&E) -> bool,
}

impl Default for RetryPolicy<FetchError> {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
            min_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            retry_if: FetchError::is_retryable,
        }
    }
}

impl<E> RetryPolicy<E> {
    /// Wait after failed attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(factor)
            .max(self.min_delay)
            .min(self.max_delay)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or the
/// policy runs out of attempts. `op` receives the 1-based attempt number.
pub async fn execute<T, E, F, Fut>(policy: &RetryPolicy<E>, label: &str, mut op: F) -> Result<T, E>
where
    E: Display,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(e) if attempt < max_attempts && (policy.retry_if)(&e) => {
                let wait = policy.delay_for(attempt);
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying in {:.1}s",
                    label,
                    attempt,
                    max_attempts,
                    e,
                    wait.as_secs_f64()
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
