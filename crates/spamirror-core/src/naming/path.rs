//! Name hints taken from URL paths.

use url::Url;

/// Last non-empty path segment of `url`, still percent-encoded.
///
/// Returns `None` for the root path and for `.`/`..` segments.
pub fn basename_from_url(url: &Url) -> Option<String> {
    let segment = url.path_segments()?.filter(|s| !s.is_empty()).last()?;
    if segment == "." || segment == ".." {
        return None;
    }
    Some(segment.to_string())
}

/// URL path with `/` replaced by `-`, used when a page has no title.
///
/// `https://app.example.com/0/my_tasks/` → `0-my_tasks`; the root yields `None`.
pub fn path_slug_source(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let joined = parsed
        .path()
        .split('/')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}
