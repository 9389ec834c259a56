//! Scripted collaborators: a fixture browser, a manual-auth stand-in and a
//! counting asset fetcher. Browser and auth share one event log so tests can
//! check the order in which things happened.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use spamirror_core::bootstrap::ManualAuth;
use spamirror_core::config::MirrorConfig;
use spamirror_core::error::{FetchError, RenderError};
use spamirror_core::fetch::AssetFetcher;
use spamirror_core::html::heuristics::ElementTarget;
use spamirror_core::render::{Browser, RenderedPage};
use url::Url;

pub type EventLog = Rc<RefCell<Vec<String>>>;

pub fn event_log() -> EventLog {
    Rc::new(RefCell::new(Vec::new()))
}

/// Config pointing every path into `dir`, with no settle delay.
pub fn test_config(dir: &Path) -> MirrorConfig {
    MirrorConfig {
        output_dir: dir.join("out"),
        session_file: Some(dir.join("state").join("session.bin")),
        prelogin_seeds: Vec::new(),
        post_login_seeds: vec!["https://app.example.com/0/home".to_string()],
        render_wait_ms: 0,
        navigation_timeout_secs: 5,
        asset_workers: 2,
        ..MirrorConfig::default()
    }
}

struct Page {
    html: String,
    title: String,
    final_url: Option<String>,
}

fn key(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

pub struct FixtureBrowser {
    pages: HashMap<String, Page>,
    failures: HashMap<String, usize>,
    after_enter: Option<String>,
    current: Option<RenderedPage>,
    reject_import: bool,
    pub session_blob: Vec<u8>,
    pub imported: Option<Vec<u8>>,
    log: EventLog,
}

impl FixtureBrowser {
    pub fn new(log: EventLog) -> Self {
        Self {
            pages: HashMap::new(),
            failures: HashMap::new(),
            after_enter: None,
            current: None,
            reject_import: false,
            session_blob: b"fixture-session".to_vec(),
            imported: None,
            log,
        }
    }

    pub fn page(mut self, url: &str, title: &str, body: &str) -> Self {
        let html = format!("<html><head><title>{}</title></head><body>{}</body></html>", title, body);
        self.pages.insert(
            key(url),
            Page {
                html,
                title: title.to_string(),
                final_url: None,
            },
        );
        self
    }

    /// `url` renders `target`'s content and reports `target` as its URL.
    pub fn redirect(mut self, url: &str, target: &str) -> Self {
        let (html, title) = match self.pages.get(&key(target)) {
            Some(p) => (p.html.clone(), p.title.clone()),
            None => (String::new(), String::new()),
        };
        self.pages.insert(
            key(url),
            Page {
                html,
                title,
                final_url: Some(target.to_string()),
            },
        );
        self
    }

    /// The next `times` navigations to `url` fail.
    pub fn failing(mut self, url: &str, times: usize) -> Self {
        self.failures.insert(key(url), times);
        self
    }

    /// Pressing Enter shows `url`.
    pub fn on_enter(mut self, url: &str) -> Self {
        self.after_enter = Some(url.to_string());
        self
    }

    pub fn rejecting_import(mut self) -> Self {
        self.reject_import = true;
        self
    }

    fn record(&self, event: String) {
        self.log.borrow_mut().push(event);
    }
}

/// Navigations recorded in `log`, in order.
pub fn navigations(log: &EventLog) -> Vec<String> {
    log.borrow()
        .iter()
        .filter_map(|e| e.strip_prefix("navigate ").map(str::to_string))
        .collect()
}

impl Browser for FixtureBrowser {
    fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), RenderError> {
        self.record(format!("navigate {}", url));
        let k = key(url);
        if let Some(left) = self.failures.get_mut(&k) {
            if *left > 0 {
                *left -= 1;
                return Err(RenderError::Navigation {
                    url: url.to_string(),
                    reason: "scripted failure".to_string(),
                });
            }
        }
        let page = self.pages.get(&k).ok_or_else(|| RenderError::Navigation {
            url: url.to_string(),
            reason: "HTTP 404".to_string(),
        })?;
        self.current = Some(RenderedPage {
            html: page.html.clone(),
            title: page.title.clone(),
            final_url: page.final_url.clone().unwrap_or_else(|| url.to_string()),
        });
        Ok(())
    }

    fn snapshot(&mut self) -> Result<RenderedPage, RenderError> {
        self.current.clone().ok_or(RenderError::NoPage)
    }

    fn click(&mut self, target: &ElementTarget) -> Result<(), RenderError> {
        self.record(format!("click {}", target.selector));
        let current = self.current.as_ref().ok_or(RenderError::NoPage)?;
        let href = target
            .href
            .as_deref()
            .ok_or(RenderError::Unsupported("clicking elements without an href"))?;
        let base = Url::parse(&current.final_url).map_err(|e| RenderError::Navigation {
            url: current.final_url.clone(),
            reason: e.to_string(),
        })?;
        let next = base.join(href).map_err(|e| RenderError::Navigation {
            url: href.to_string(),
            reason: e.to_string(),
        })?;
        self.navigate(next.as_str(), Duration::from_secs(1))
    }

    fn fill(&mut self, target: &ElementTarget, value: &str) -> Result<(), RenderError> {
        self.record(format!("fill {} {}", target.selector, value));
        Ok(())
    }

    fn press_enter(&mut self) -> Result<(), RenderError> {
        self.record("enter".to_string());
        match self.after_enter.clone() {
            Some(url) => self.navigate(&url, Duration::from_secs(1)),
            None => Ok(()),
        }
    }

    fn export_session(&mut self) -> Result<Vec<u8>, RenderError> {
        self.record("export".to_string());
        Ok(self.session_blob.clone())
    }

    fn import_session(&mut self, blob: &[u8]) -> Result<(), RenderError> {
        self.record("import".to_string());
        if self.reject_import {
            return Err(RenderError::Unavailable("session format not recognized".to_string()));
        }
        self.imported = Some(blob.to_vec());
        Ok(())
    }
}

/// Manual login stand-in that just records the call.
pub struct RecordingAuth {
    log: EventLog,
    cancel_on_login: Option<Arc<AtomicBool>>,
}

impl RecordingAuth {
    pub fn new(log: EventLog) -> Self {
        Self {
            log,
            cancel_on_login: None,
        }
    }

    /// Sets `token` while "waiting", as a Ctrl-C at the login prompt would.
    pub fn cancelling(log: EventLog, token: Arc<AtomicBool>) -> Self {
        Self {
            log,
            cancel_on_login: Some(token),
        }
    }
}

impl ManualAuth for RecordingAuth {
    fn wait_for_login(&mut self, login_url: Option<&str>) -> anyhow::Result<()> {
        self.log
            .borrow_mut()
            .push(format!("auth {}", login_url.unwrap_or("-")));
        if let Some(token) = &self.cancel_on_login {
            token.store(true, Ordering::Relaxed);
        }
        Ok(())
    }
}

/// Writes a small body per asset; fails for URLs whose path contains "broken".
#[derive(Default)]
pub struct CountingFetcher {
    calls: Mutex<Vec<String>>,
}

impl CountingFetcher {
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_for(&self, url: &str) -> usize {
        self.calls().iter().filter(|u| u.as_str() == url).count()
    }
}

impl AssetFetcher for CountingFetcher {
    fn fetch(&self, url: &Url, dest: &Path) -> Result<u64, FetchError> {
        self.calls.lock().unwrap().push(url.to_string());
        if url.path().contains("broken") {
            return Err(FetchError::Http(404));
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(dest, b"asset")?;
        Ok(5)
    }
}
