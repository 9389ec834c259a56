//! Static HTTP browser backed by libcurl.
//!
//! Fetches server-rendered markup without executing scripts. Clicks follow an
//! element's `href`; typing is unsupported. The session blob is the set of
//! extra request headers (typically a `Cookie`), stored as JSON.

use std::collections::BTreeMap;
use std::time::Duration;

use url::Url;

use super::{Browser, RenderedPage};
use crate::error::RenderError;
use crate::html::heuristics::ElementTarget;
use crate::html::Document;

const DEFAULT_USER_AGENT: &str = concat!("spamirror/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Default)]
pub struct HttpBrowserOptions {
    /// Extra request headers sent with every navigation.
    pub headers: BTreeMap<String, String>,
    pub user_agent: Option<String>,
    /// Recorded for parity with windowed browsers; this backend never shows one.
    pub headless: bool,
}

pub struct HttpBrowser {
    options: HttpBrowserOptions,
    session_headers: BTreeMap<String, String>,
    current: Option<RenderedPage>,
    last_timeout: Duration,
}

impl HttpBrowser {
    /// Fails with `RenderError::Unavailable` when libcurl lacks HTTP support.
    pub fn new(options: HttpBrowserOptions) -> Result<Self, RenderError> {
        curl::init();
        let version = curl::Version::get();
        if !version.protocols().any(|p| p == "http") {
            return Err(RenderError::Unavailable(format!(
                "libcurl {} was built without HTTP support",
                version.version()
            )));
        }
        if !options.headless {
            tracing::debug!("http browser has no window; headless setting ignored");
        }
        Ok(Self {
            options,
            session_headers: BTreeMap::new(),
            current: None,
            last_timeout: Duration::from_secs(60),
        })
    }

    fn request_headers(&self) -> BTreeMap<String, String> {
        let mut merged = self.options.headers.clone();
        merged.extend(self.session_headers.clone());
        merged
    }

    /// GET `url`, following redirects. Returns (final URL, body).
    fn get(&self, url: &str, timeout: Duration) -> Result<(String, Vec<u8>), RenderError> {
        let nav_err = |reason: String| RenderError::Navigation {
            url: url.to_string(),
            reason,
        };
        let curl_err = |e: curl::Error| {
            if e.is_operation_timedout() {
                RenderError::Timeout {
                    url: url.to_string(),
                    timeout,
                }
            } else {
                nav_err(e.to_string())
            }
        };

        let mut body = Vec::new();
        let mut easy = curl::easy::Easy::new();
        easy.url(url).map_err(curl_err)?;
        easy.follow_location(true).map_err(curl_err)?;
        easy.max_redirections(10).map_err(curl_err)?;
        easy.connect_timeout(timeout.min(Duration::from_secs(30))).map_err(curl_err)?;
        easy.timeout(timeout).map_err(curl_err)?;
        easy.accept_encoding("").map_err(curl_err)?;
        easy.useragent(self.options.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT))
            .map_err(curl_err)?;

        let headers = self.request_headers();
        if !headers.is_empty() {
            let mut list = curl::easy::List::new();
            for (k, v) in &headers {
                list.append(&format!("{}: {}", k.trim(), v.trim())).map_err(curl_err)?;
            }
            easy.http_headers(list).map_err(curl_err)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(curl_err)?;
            transfer.perform().map_err(curl_err)?;
        }

        let code = easy.response_code().map_err(curl_err)?;
        if !(200..300).contains(&code) {
            return Err(nav_err(format!("HTTP {}", code)));
        }
        let final_url = easy
            .effective_url()
            .map_err(curl_err)?
            .unwrap_or(url)
            .to_string();
        Ok((final_url, body))
    }
}

impl Browser for HttpBrowser {
    fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), RenderError> {
        self.last_timeout = timeout;
        let (final_url, body) = self.get(url, timeout)?;
        let html = String::from_utf8(body).map_err(|e| RenderError::Parse {
            url: final_url.clone(),
            reason: format!("response is not UTF-8: {}", e),
        })?;
        let title = Document::parse(&html).title().unwrap_or_default();
        tracing::debug!(url, final_url = %final_url, bytes = html.len(), "fetched page");
        self.current = Some(RenderedPage {
            html,
            title,
            final_url,
        });
        Ok(())
    }

    fn snapshot(&mut self) -> Result<RenderedPage, RenderError> {
        self.current.clone().ok_or(RenderError::NoPage)
    }

    fn click(&mut self, target: &ElementTarget) -> Result<(), RenderError> {
        let current = self.current.as_ref().ok_or(RenderError::NoPage)?;
        let href = target
            .href
            .as_deref()
            .ok_or(RenderError::Unsupported("clicking elements without an href"))?;
        let base = Url::parse(&current.final_url).map_err(|e| RenderError::Navigation {
            url: current.final_url.clone(),
            reason: e.to_string(),
        })?;
        let next = crate::route::resolve_reference(&base, href)
            .ok_or(RenderError::Unsupported("clicking non-navigable links"))?;
        let timeout = self.last_timeout;
        self.navigate(next.as_str(), timeout)
    }

    fn fill(&mut self, _target: &ElementTarget, _value: &str) -> Result<(), RenderError> {
        Err(RenderError::Unsupported("typing into form fields"))
    }

    fn press_enter(&mut self) -> Result<(), RenderError> {
        Err(RenderError::Unsupported("keyboard input"))
    }

    fn export_session(&mut self) -> Result<Vec<u8>, RenderError> {
        serde_json::to_vec_pretty(&self.request_headers())
            .map_err(|e| RenderError::Unavailable(format!("serialize session: {}", e)))
    }

    fn import_session(&mut self, blob: &[u8]) -> Result<(), RenderError> {
        let headers: BTreeMap<String, String> = serde_json::from_slice(blob)
            .map_err(|e| RenderError::Unavailable(format!("parse session: {}", e)))?;
        self.session_headers = headers;
        Ok(())
    }
}
