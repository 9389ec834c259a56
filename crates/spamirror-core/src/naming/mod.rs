//! Slug and filename namespace for mirrored pages and their assets.
//!
//! Slugs are derived from page titles (or paths), trading exact
//! reversibility for readability. Filenames are made unique against the real
//! filesystem state, so the namespace stays collision-free across restarts.

mod path;
mod sanitize;

use std::path::Path;
use url::Url;

pub use path::{basename_from_url, path_slug_source};
pub use sanitize::{host_safe, sanitize_component};

/// Fallback slug when neither text nor the caller's default yields anything.
pub const DEFAULT_SLUG: &str = "page";

/// Fallback basename for assets whose URL path has no last segment.
const DEFAULT_ASSET_BASENAME: &str = "asset";

/// Separator between the host and basename parts of an asset name.
const ASSET_NAME_SEPARATOR: &str = "__";

/// Makes a filesystem-safe, human-legible slug from `text`.
///
/// Lower-cases, drops everything except alphanumerics, `-`, `_` and
/// whitespace, turns each run of whitespace, `_` and `-` into a single hyphen
/// and trims hyphens at both ends. An empty result falls back to `fallback`
/// (slugified the same way), and then to [`DEFAULT_SLUG`].
///
/// - `slugify("My Tasks", "page")` → `"my-tasks"`
/// - `slugify("Inbox | Asana", "page")` → `"inbox-asana"`
/// - `slugify("!!!", "login")` → `"login"`
pub fn slugify(text: &str, fallback: &str) -> String {
    let slug = slug_chars(text);
    if !slug.is_empty() {
        return slug;
    }
    let fallback = slug_chars(fallback);
    if fallback.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        fallback
    }
}

fn slug_chars(text: &str) -> String {
    let lowered = text.trim().to_lowercase();
    let mut out = String::with_capacity(lowered.len());
    let mut pending_hyphen = false;
    for c in lowered.chars() {
        if c.is_alphanumeric() {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c);
        } else if c == '-' || c == '_' || c.is_whitespace() {
            pending_hyphen = true;
        }
    }
    out
}

/// Returns `slug.ext` if that file does not exist in `dir`, otherwise the
/// first free `slug-2.ext`, `slug-3.ext`, ….
///
/// Checked against the filesystem at call time; the caller must create the
/// file before asking again for the same slug.
pub fn unique_filename(dir: &Path, slug: &str, ext: &str) -> String {
    let ext = ext.trim_start_matches('.');
    let mut candidate = format!("{}.{}", slug, ext);
    let mut n = 1u32;
    while dir.join(&candidate).exists() {
        n += 1;
        candidate = format!("{}-{}.{}", slug, n, ext);
    }
    candidate
}

/// Filename without its last extension (`home-2.html` → `home-2`).
pub fn file_stem(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(i) if i > 0 => &filename[..i],
        _ => filename,
    }
}

/// Slug source for a rendered page: its title, else its path, else `fallback`.
pub fn page_slug(title: &str, url: &str, fallback: &str) -> String {
    let title = title.trim();
    if !title.is_empty() {
        return slugify(title, fallback);
    }
    match path_slug_source(url) {
        Some(p) => slugify(&p, fallback),
        None => slugify(fallback, DEFAULT_SLUG),
    }
}

/// Deterministic local name for a remote asset: `host_safe + "__" + basename`.
///
/// `https://cdn.example.com/static/app.css` → `cdn_example_com__app.css`.
/// The same URL always maps to the same name; the query string is ignored.
pub fn local_asset_name(url: &Url) -> String {
    let authority = match (url.host_str(), url.port()) {
        (Some(h), Some(p)) => format!("{}:{}", h, p),
        (Some(h), None) => h.to_string(),
        (None, _) => String::new(),
    };
    let host = host_safe(&authority);
    let budget = 255usize.saturating_sub(host.len() + ASSET_NAME_SEPARATOR.len());
    let basename = basename_from_url(url)
        .map(|b| sanitize_component(&b, budget))
        .filter(|b| !b.is_empty())
        .unwrap_or_else(|| DEFAULT_ASSET_BASENAME.to_string());
    format!("{}{}{}", host, ASSET_NAME_SEPARATOR, basename)
}
