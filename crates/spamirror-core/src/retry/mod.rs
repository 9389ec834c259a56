//! Retry and backoff policy for asset downloads.
//!
//! Classifies fetch failures (timeouts, throttling, connection resets) and
//! decides exponential backoff so every fetcher shares one policy. Page
//! navigation does not go through here: it is retried exactly once by the
//! traversal controller.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{FailureKind, RetryPolicy};
pub use run::run_with_retry;
