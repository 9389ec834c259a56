//! Typed errors raised by the engine's collaborators.
//!
//! None of these abort a run on their own: the traversal controller, the
//! asset localizer and the bootstrap sequence decide how each one is handled.
//! Only `RenderError::Unavailable` at startup is fatal.

use std::time::Duration;
use thiserror::Error;

/// Failure of the render collaborator (navigation, snapshot or interaction).
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },
    #[error("navigation to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },
    #[error("could not parse document from {url}: {reason}")]
    Parse { url: String, reason: String },
    #[error("browser does not support {0}")]
    Unsupported(&'static str),
    #[error("no page has been rendered yet")]
    NoPage,
    #[error("browser unavailable: {0}")]
    Unavailable(String),
}

/// Failure of the fetch collaborator for one asset.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Curl reported an error (timeout, connection, etc.).
    #[error(transparent)]
    Curl(#[from] curl::Error),
    /// HTTP response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Writing the downloaded bytes failed (disk full, permission denied). Not retried.
    #[error("storage: {0}")]
    Storage(#[from] std::io::Error),
    #[error("invalid asset URL: {0}")]
    InvalidUrl(String),
}

/// Best-effort bootstrap step that found nothing to act on.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("no element matched for {step}")]
    HeuristicMiss { step: &'static str },
    #[error("{step} interaction failed: {source}")]
    Interaction {
        step: &'static str,
        #[source]
        source: RenderError,
    },
}
