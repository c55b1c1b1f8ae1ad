// Retry logic for whole-install attempts
// Author: kelexine (https://github.com/kelexine)

use crate::error::{CacheError, Result};
use backoff::{backoff::Backoff, ExponentialBackoff};
use std::time::Duration;
use tracing::{debug, warn};

/// Create exponential backoff configuration for install retries
pub fn create_backoff() -> ExponentialBackoff {
    ExponentialBackoff {
        current_interval: Duration::from_millis(500), // Start at 500ms
        initial_interval: Duration::from_millis(500),
        randomization_factor: 0.3, // Add jitter
        multiplier: 2.0,           // Double each time
        max_interval: Duration::from_secs(10),
        max_elapsed_time: Some(Duration::from_secs(60)),
        ..Default::default()
    }
}

/// Whether retrying the whole operation could change the outcome.
///
/// Configuration mistakes (bad URLs) fail the same way every time.
pub fn is_retryable(error: &CacheError) -> bool {
    !matches!(error, CacheError::InvalidUrl(_) | CacheError::Config(_))
}

/// Run `operation` up to `max_attempts` times, sleeping between attempts
/// according to `backoff`.
pub async fn with_retry<F, Fut, T>(
    operation_name: &str,
    max_attempts: u32,
    mut backoff: ExponentialBackoff,
    mut operation: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        match operation().await {
            Ok(result) => {
                if attempt > 1 {
                    debug!("{} succeeded on attempt {}", operation_name, attempt);
                }
                return Ok(result);
            }
            Err(e) => {
                if !is_retryable(&e) || attempt >= max_attempts {
                    return Err(e);
                }

                let Some(delay) = backoff.next_backoff() else {
                    warn!("{} giving up after {} attempt(s): backoff exhausted", operation_name, attempt);
                    return Err(e);
                };
                warn!(
                    "{} failed (attempt {}/{}): {}; retrying after {}ms",
                    operation_name,
                    attempt,
                    max_attempts,
                    e,
                    delay.as_millis()
                );

                tokio::time::sleep(delay).await;
            }
        }
    }
}
