//! Canonical in-app routes and reference resolution.

use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use url::Url;

/// A canonical address inside the target app.
///
/// Identity is the absolute URL with the fragment and any trailing `/`
/// removed, so `https://app.example.com/` and `https://app.example.com`
/// are the same route. Query strings are kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Route(String);

impl Route {
    /// Canonicalize an absolute http(s) URL. Returns `None` for anything else.
    pub fn parse(url: &str) -> Option<Route> {
        let parsed = Url::parse(url.trim()).ok()?;
        Route::from_url(parsed)
    }

    pub fn from_url(mut url: Url) -> Option<Route> {
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        url.set_fragment(None);
        let s: String = url.into();
        Some(Route(s.trim_end_matches('/').to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host of the route (lower-cased by the URL parser).
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.0).ok()?.host_str().map(str::to_string)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Route {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Resolves a raw `href`/`src`/`url(...)` value found in a document against `base`.
///
/// Handles absolute, protocol-relative (`//cdn…`), root-relative (`/x`) and
/// relative forms. Rejects empty and fragment-only references, `javascript:`,
/// `mailto:`, `data:` and every other non-http(s) scheme.
pub fn resolve_reference(base: &Url, raw: &str) -> Option<Url> {
    let raw = raw.trim();
    let without_fragment = raw.split('#').next().unwrap_or("").trim();
    if without_fragment.is_empty() {
        return None;
    }
    let lowered = without_fragment.to_ascii_lowercase();
    if lowered.starts_with("javascript:") || lowered.starts_with("mailto:") || lowered.starts_with("data:") {
        return None;
    }
    let mut joined = base.join(without_fragment).ok()?;
    if !matches!(joined.scheme(), "http" | "https") {
        return None;
    }
    joined.set_fragment(None);
    Some(joined)
}

fn numeric_id_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"/0/\d+").expect("static numeric-id pattern"))
}

/// True for per-object detail routes of the shape `/0/<digits>`.
///
/// Deliberately narrow: other ID-bearing path shapes are not matched.
pub fn is_numeric_id_route(route: &Route) -> bool {
    numeric_id_pattern().is_match(route.as_str())
}

/// True if `host` is `domain` or one of its subdomains.
pub fn host_in_domain(host: &str, domain: &str) -> bool {
    let host = host.trim_end_matches('.').to_ascii_lowercase();
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return false;
    }
    host == domain
        || host
            .strip_suffix(domain.as_str())
            .is_some_and(|prefix| prefix.ends_with('.'))
}
