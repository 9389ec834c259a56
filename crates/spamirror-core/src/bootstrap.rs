//! Pre-authentication bootstrap.
//!
//! Captures the screens a user sees before logging in (landing, signup, the
//! login form and its second step), then obtains an authenticated session:
//! either restored from disk or produced by a manual login and persisted.
//! Every interaction is best-effort; a miss is logged and the sequence goes on.

use anyhow::{Context, Result};

use crate::control::{Interrupt, RunControl};
use crate::error::{BootstrapError, RenderError};
use crate::html::heuristics::{
    find_first, ElementMatcher, ElementTarget, ADVANCE_BUTTON, EMAIL_INPUT, LOGIN_REVEAL, PLACEHOLDER_EMAIL,
};
use crate::html::Document;
use crate::mapping::{MappingStore, PageRecord};
use crate::naming::page_slug;
use crate::pages::PageSaver;
use crate::render::{render, Browser, RenderTiming, RenderedPage};
use crate::session::{SessionState, SessionStore};

/// Slug fallback for pre-login seeds without a title or path.
const PRELOGIN_FALLBACK_SLUG: &str = "login";
const LOGIN_SCREEN_SLUG: &str = "login";
const PASSWORD_SCREEN_SLUG: &str = "login-password";

/// Hands control to a human until they have logged in.
pub trait ManualAuth {
    /// Blocks until the operator has completed login in the browser.
    /// `login_url` is where the browser was sent, if one is configured.
    fn wait_for_login(&mut self, login_url: Option<&str>) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct BootstrapOutcome {
    pub state: SessionState,
    pub saved: Vec<PageRecord>,
    pub heuristic_misses: usize,
    /// Set when the run was stopped before bootstrap completed.
    pub interrupted: Option<Interrupt>,
}

pub struct Bootstrap<'a> {
    pub prelogin_seeds: &'a [String],
    pub login_url: Option<&'a str>,
    pub timing: RenderTiming,
}

struct Run<'r, 'f> {
    browser: &'r mut dyn Browser,
    pages: &'r mut PageSaver<'f>,
    mapping: &'r mut MappingStore,
    timing: RenderTiming,
    saved: Vec<PageRecord>,
    misses: usize,
}

impl Run<'_, '_> {
    fn finish(self, state: SessionState, interrupted: Option<Interrupt>) -> BootstrapOutcome {
        if let Some(reason) = interrupted {
            tracing::warn!(state = ?state, reason = %reason, "bootstrap interrupted");
        }
        BootstrapOutcome {
            state,
            saved: self.saved,
            heuristic_misses: self.misses,
            interrupted,
        }
    }
}

impl Bootstrap<'_> {
    pub fn run(
        &self,
        browser: &mut dyn Browser,
        pages: &mut PageSaver<'_>,
        mapping: &mut MappingStore,
        session: &SessionStore,
        auth: &mut dyn ManualAuth,
        control: &RunControl,
    ) -> Result<BootstrapOutcome> {
        let mut state = restore_session(browser, session);
        let mut run = Run {
            browser,
            pages,
            mapping,
            timing: self.timing,
            saved: Vec::new(),
            misses: 0,
        };

        for seed in self.prelogin_seeds {
            if let Some(reason) = control.interrupt() {
                return Ok(run.finish(state, Some(reason)));
            }
            match render(&mut *run.browser, seed, self.timing) {
                Ok(page) => {
                    let slug = page_slug(&page.title, &page.final_url, PRELOGIN_FALLBACK_SLUG);
                    run.save_current(&slug, Some((page, seed.as_str())));
                }
                Err(e) => tracing::warn!(url = %seed, error = %e, "pre-login seed failed"),
            }
        }
        if let Some(reason) = control.interrupt() {
            return Ok(run.finish(state, Some(reason)));
        }

        if let Some(target) = run.find("login reveal", LOGIN_REVEAL) {
            run.interact("login reveal", |b| b.click(&target));
        }
        run.save_current(LOGIN_SCREEN_SLUG, None);

        if let Some(input) = run.find("email input", EMAIL_INPUT) {
            let filled = run.interact("email input", |b| b.fill(&input, PLACEHOLDER_EMAIL));
            if filled {
                if let Err(e) = run.browser.press_enter() {
                    tracing::debug!(error = %e, "enter after email ignored");
                }
                self.timing.pause();
            }
            if let Some(button) = run.find("advance button", ADVANCE_BUTTON) {
                run.interact("advance button", |b| b.click(&button));
            }
        }
        run.save_current(PASSWORD_SCREEN_SLUG, None);

        if !state.is_authenticated() {
            if let Some(reason) = control.interrupt() {
                return Ok(run.finish(state, Some(reason)));
            }
            state = SessionState::AwaitingManualAuth;
            match self.login_url {
                Some(url) => {
                    if let Err(e) = run.browser.navigate(url, self.timing.navigation_timeout) {
                        tracing::warn!(url, error = %e, "could not open login page");
                    }
                }
                None => tracing::warn!("no login URL configured; waiting on the current page"),
            }
            tracing::info!(state = ?state, "waiting for manual login");
            auth.wait_for_login(self.login_url)?;
            if control.interrupt() == Some(Interrupt::Cancelled) {
                return Ok(run.finish(state, Some(Interrupt::Cancelled)));
            }
            let blob = run.browser.export_session().context("export session")?;
            session.save(&blob)?;
            tracing::info!(path = %session.path().display(), bytes = blob.len(), "session persisted");
            state = SessionState::SessionPersisted;
        }

        Ok(run.finish(state, None))
    }
}

fn restore_session(browser: &mut dyn Browser, session: &SessionStore) -> SessionState {
    let blob = match session.load() {
        Ok(Some(b)) => b,
        Ok(None) => return SessionState::NoSession,
        Err(e) => {
            tracing::warn!(error = %e, "could not read stored session");
            return SessionState::NoSession;
        }
    };
    match browser.import_session(&blob) {
        Ok(()) => {
            tracing::info!(path = %session.path().display(), "restored stored session");
            SessionState::SessionRestored
        }
        Err(e) => {
            tracing::warn!(error = %e, "stored session rejected; continuing without one");
            SessionState::NoSession
        }
    }
}

impl Run<'_, '_> {
    /// Evaluates `candidates` against the current screen.
    fn find(&mut self, step: &'static str, candidates: &[ElementMatcher]) -> Option<ElementTarget> {
        let page = match self.browser.snapshot() {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(step, error = %e, "no screen to inspect");
                self.misses += 1;
                return None;
            }
        };
        let found = find_first(&Document::parse(&page.html), candidates);
        match &found {
            Some(t) => tracing::debug!(step, selector = %t.selector, "heuristic matched"),
            None => {
                let miss = BootstrapError::HeuristicMiss { step };
                tracing::info!(error = %miss, "bootstrap step skipped");
                self.misses += 1;
            }
        }
        found
    }

    /// Runs one interaction and settles. Returns whether it succeeded.
    fn interact<F>(&mut self, step: &'static str, f: F) -> bool
    where
        F: FnOnce(&mut dyn Browser) -> Result<(), RenderError>,
    {
        match f(&mut *self.browser) {
            Ok(()) => {
                self.timing.pause();
                true
            }
            Err(source) => {
                let err = BootstrapError::Interaction { step, source };
                tracing::warn!(error = %err, "bootstrap interaction failed");
                false
            }
        }
    }

    /// Saves `page` (or a fresh snapshot) under `slug`; failures are logged.
    /// A page comes with the URL it was requested under, which is what the
    /// mapping records; a snapshot is recorded under its own URL.
    fn save_current(&mut self, slug: &str, page: Option<(RenderedPage, &str)>) {
        let (page, requested) = match page {
            Some((p, url)) => (p, url.to_string()),
            None => match self.browser.snapshot() {
                Ok(p) => {
                    let url = p.final_url.clone();
                    (p, url)
                }
                Err(e) => {
                    tracing::warn!(slug, error = %e, "nothing to save");
                    return;
                }
            },
        };
        let doc = Document::parse(&page.html);
        match self
            .pages
            .save(&doc, &page.final_url, slug, &requested, &mut *self.mapping)
        {
            Ok(saved) => self.saved.push(saved.record),
            Err(e) => tracing::warn!(slug, url = %requested, error = %e, "could not save bootstrap screen"),
        }
    }
}
