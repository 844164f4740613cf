//! Client-internal retry policy shared by the HTTP clients
//!
//! Only errors where [`LlmError::is_retryable`] holds are retried.
//! Authentication and rate-limit failures go straight back to the caller.

use std::future::Future;
use std::time::Duration;

use tracing::{debug, warn};

use super::{CompletionResponse, LlmError};

/// Initial backoff delay for retries
pub(crate) const INITIAL_BACKOFF: Duration = Duration::from_millis(1000);

/// Longest single backoff delay
const MAX_BACKOFF: Duration = Duration::from_secs(30);

/// Delay before retry number `attempt` (1-based), doubling each time up to [`MAX_BACKOFF`]
pub(crate) fn backoff_delay(initial: Duration, attempt: u32) -> Duration {
    let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
    initial.saturating_mul(factor).min(MAX_BACKOFF)
}

/// Run `send` until it succeeds, fails with a non-retryable error, or
/// `max_retries` retries have been spent
pub(crate) async fn with_retries<F, Fut>(
    max_retries: u32,
    initial_backoff: Duration,
    mut send: F,
) -> Result<CompletionResponse, LlmError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<CompletionResponse, LlmError>>,
{
    let mut attempt = 0;
    loop {
        match send().await {
            Ok(response) => {
                debug!(attempt, usage = response.usage.total(), "with_retries: success");
                return Ok(response);
            }
            Err(e) if e.is_retryable() && attempt < max_retries => {
                attempt += 1;
                let backoff = backoff_delay(initial_backoff, attempt);
                warn!(
                    attempt,
                    backoff_ms = backoff.as_millis() as u64,
                    error = %e,
                    "with_retries: retrying after transient error"
                );
                tokio::time::sleep(backoff).await;
            }
            Err(e) => {
                debug!(attempt, error = %e, "with_retries: giving up");
                return Err(e);
            }
        }
    }
}
