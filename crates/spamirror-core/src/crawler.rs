//! Traversal controller: breadth-first crawl of the authenticated app.

use std::fmt;

use url::Url;

use crate::control::{Interrupt, RunControl};
use crate::frontier::{Admission, AdmissionPolicy, Frontier};
use crate::html::{extract_links, Document};
use crate::mapping::MappingStore;
use crate::naming::page_slug;
use crate::pages::PageSaver;
use crate::render::{render_with_retry, Browser, RenderTiming};
use crate::route::Route;

/// Slug fallback for pages with neither a title nor a path.
const UNTITLED_SLUG: &str = "untitled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    QueueExhausted,
    PageLimit,
    Interrupted(Interrupt),
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::QueueExhausted => write!(f, "no routes left"),
            StopReason::PageLimit => write!(f, "page limit reached"),
            StopReason::Interrupted(i) => write!(f, "{}", i),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub saved: usize,
    /// Routes that failed to render twice.
    pub failed: usize,
    /// Routes rendered but not saved, or reached again through a redirect.
    pub skipped: usize,
    pub stop: StopReason,
}

pub struct Crawler<'c> {
    frontier: Frontier,
    max_pages: usize,
    timing: RenderTiming,
    control: &'c RunControl,
}

impl<'c> Crawler<'c> {
    pub fn new(policy: AdmissionPolicy, max_pages: usize, timing: RenderTiming, control: &'c RunControl) -> Self {
        Self {
            frontier: Frontier::new(policy),
            max_pages,
            timing,
            control,
        }
    }

    /// Queues the entry routes. Returns how many were admitted.
    pub fn seed(&mut self, seeds: &[String]) -> usize {
        let mut admitted = 0;
        for seed in seeds {
            let Some(route) = Route::parse(seed) else {
                tracing::warn!(seed = %seed, "ignoring seed that is not an http(s) URL");
                continue;
            };
            match self.frontier.enqueue_if_admissible(route) {
                Admission::Accepted => admitted += 1,
                other => tracing::warn!(seed = %seed, verdict = ?other, "seed not admitted"),
            }
        }
        admitted
    }

    /// Crawls until the queue is empty, `max_pages` pages are saved, or the
    /// run is interrupted. A route that fails to render twice is abandoned.
    pub fn run(&mut self, browser: &mut dyn Browser, pages: &mut PageSaver<'_>, mapping: &mut MappingStore) -> CrawlSummary {
        let mut saved = 0usize;
        let mut failed = 0usize;
        let mut skipped = 0usize;

        let stop = loop {
            if saved >= self.max_pages {
                break StopReason::PageLimit;
            }
            if let Some(interrupt) = self.control.interrupt() {
                break StopReason::Interrupted(interrupt);
            }
            let Some(route) = self.frontier.pop_next() else {
                break StopReason::QueueExhausted;
            };
            if !self.frontier.mark_visited(&route) {
                skipped += 1;
                continue;
            }

            let page = match render_with_retry(&mut *browser, route.as_str(), self.timing) {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!(url = %route, error = %e, "giving up on route");
                    failed += 1;
                    continue;
                }
            };
            let final_route = Route::parse(&page.final_url);
            if let Some(r) = final_route.as_ref().filter(|r| **r != route) {
                tracing::debug!(url = %route, final_url = %r, "route redirected");
                self.frontier.mark_visited(r);
            }
            let base = match Url::parse(&page.final_url).or_else(|_| Url::parse(route.as_str())) {
                Ok(u) => u,
                Err(e) => {
                    tracing::warn!(url = %route, error = %e, "unusable page URL");
                    skipped += 1;
                    continue;
                }
            };

            let doc = Document::parse(&page.html);
            let links = extract_links(&doc, &base);
            let slug = page_slug(&page.title, base.as_str(), UNTITLED_SLUG);
            match pages.save(&doc, base.as_str(), &slug, route.as_str(), &mut *mapping) {
                Ok(_) => saved += 1,
                Err(e) => {
                    tracing::error!(url = %route, error = %e, "could not save page");
                    skipped += 1;
                }
            }

            let mut admitted = 0usize;
            for link in links {
                if let Some(r) = Route::from_url(link) {
                    if self.frontier.enqueue_if_admissible(r).is_accepted() {
                        admitted += 1;
                    }
                }
            }
            tracing::debug!(
                url = %route,
                admitted,
                pending = self.frontier.pending(),
                visited = self.frontier.visited_count(),
                "links queued"
            );
        };

        tracing::info!(saved, failed, skipped, stop = %stop, "traversal finished");
        CrawlSummary {
            saved,
            failed,
            skipped,
            stop,
        }
    }
}
