//! Render collaborator: the browser the engine drives.
//!
//! The engine never renders anything itself. A [`Browser`] navigates, reports
//! the current DOM markup, title and URL, performs the few interactions the
//! bootstrap heuristics ask for, and exports/imports an opaque session blob.
//! JS-capable backends plug in here; [`HttpBrowser`] is the built-in static one.

mod http;

use std::time::Duration;

use crate::error::RenderError;
use crate::html::heuristics::ElementTarget;

pub use http::{HttpBrowser, HttpBrowserOptions};

/// Snapshot of the page currently shown by the browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub html: String,
    pub title: String,
    /// URL after redirects and client-side routing.
    pub final_url: String,
}

pub trait Browser {
    /// Navigates the single browsing context to `url`, bounded by `timeout`.
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError>;

    /// Current DOM markup, title and URL without navigating.
    fn snapshot(&mut self) -> Result<RenderedPage, RenderError>;

    fn click(&mut self, target: &ElementTarget) -> Result<(), RenderError>;

    fn fill(&mut self, target: &ElementTarget, value: &str) -> Result<(), RenderError>;

    /// Presses Enter in the focused element (form submit in most apps).
    fn press_enter(&mut self) -> Result<(), RenderError>;

    /// Serializes the authenticated state (cookies, storage) as an opaque blob.
    fn export_session(&mut self) -> Result<Vec<u8>, RenderError>;

    /// Restores a blob produced by [`Browser::export_session`].
    fn import_session(&mut self, blob: &[u8]) -> Result<(), RenderError>;
}

/// Navigation timing shared by bootstrap and traversal.
#[derive(Debug, Clone, Copy)]
pub struct RenderTiming {
    pub navigation_timeout: Duration,
    /// Fixed delay after navigation so client-side rendering can finish.
    pub settle: Duration,
}

impl RenderTiming {
    pub fn pause(&self) {
        if !self.settle.is_zero() {
            std::thread::sleep(self.settle);
        }
    }
}

/// Navigate, wait for the page to settle, then snapshot it.
pub fn render(
    browser: &mut dyn Browser,
    url: &str,
    timing: RenderTiming,
) -> Result<RenderedPage, RenderError> {
    browser.navigate(url, timing.navigation_timeout)?;
    timing.pause();
    browser.snapshot()
}

/// [`render`] with exactly one retry on failure.
pub fn render_with_retry(
    browser: &mut dyn Browser,
    url: &str,
    timing: RenderTiming,
) -> Result<RenderedPage, RenderError> {
    match render(browser, url, timing) {
        Ok(page) => Ok(page),
        Err(first) => {
            tracing::warn!(url, error = %first, "render failed, retrying once");
            render(browser, url, timing)
        }
    }
}
