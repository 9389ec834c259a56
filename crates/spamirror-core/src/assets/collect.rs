//! Finding asset references in a parsed document.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use crate::html::{Document, Element};

/// An element attribute that points at an asset.
pub(super) struct AttrSite {
    pub element: Element,
    pub attr: &'static str,
    pub value: String,
}

fn css_url_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"url\(\s*(['"]?)([^'")]+?)(['"]?)\s*\)"#).expect("static css url pattern")
    })
}

/// True for `<link>` elements that load a stylesheet or an icon.
fn is_asset_link(el: &Element) -> bool {
    let rel = el.attr_tokens("rel");
    rel.iter().any(|t| t == "stylesheet" || t.contains("icon"))
        || el
            .attr("type")
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("text/css"))
}

/// `<link href>` for stylesheets/icons and `<img src>`, in document order.
pub(super) fn attr_sites(doc: &Document) -> Vec<AttrSite> {
    let mut out = Vec::new();
    for el in doc.elements() {
        let attr = match el.tag_name() {
            "link" if is_asset_link(&el) => "href",
            "img" => "src",
            _ => continue,
        };
        if let Some(value) = el.attr(attr) {
            out.push(AttrSite {
                element: el,
                attr,
                value,
            });
        }
    }
    out
}

/// Inline `<style>` blocks.
pub(super) fn style_blocks(doc: &Document) -> Vec<Element> {
    doc.elements_named("style")
}

/// Every raw `url(...)` argument in a CSS text.
pub(super) fn css_urls(css: &str) -> Vec<String> {
    css_url_pattern()
        .captures_iter(css)
        .map(|c| c[2].trim().to_string())
        .collect()
}

/// Rewrites each `url(...)` whose argument `map` resolves, keeping the
/// original quoting; other occurrences are left as written.
pub(super) fn rewrite_css_urls<F>(css: &str, mut map: F) -> (String, usize)
where
    F: FnMut(&str) -> Option<String>,
{
    let mut rewritten = 0usize;
    let out = css_url_pattern().replace_all(css, |c: &Captures| match map(c[2].trim()) {
        Some(local) => {
            rewritten += 1;
            format!("url({q}{local}{q})", q = &c[1])
        }
        None => c[0].to_string(),
    });
    (out.into_owned(), rewritten)
}
