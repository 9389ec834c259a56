//! Retry loop: run a fetch until success or the policy says stop.

use super::classify;
use super::policy::RetryPolicy;
use crate::error::FetchError;

/// Runs `f` until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, FetchError>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => match policy.next_delay(attempt, classify::classify(&e)) {
                None => return Err(e),
                Some(d) => {
                    tracing::debug!(attempt, delay = ?d, error = %e, "retrying asset fetch");
                    std::thread::sleep(d);
                    attempt += 1;
                }
            },
        }
    }
}
