//! Candidate route discovery in rendered markup.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use url::Url;

use super::Document;
use crate::route::resolve_reference;

/// Attributes single-page apps use for client-side routes.
const ROUTE_ATTRS: &[&str] = &["href", "data-href", "data-route", "data-url"];

fn onclick_path_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"['"](/[^'"]+)['"]"#).expect("static onclick pattern"))
}

/// Every navigable URL referenced by the document, resolved against `base`,
/// de-duplicated and in document order.
///
/// Sources: `href` on any element except `<link>` (those are assets),
/// `data-href`/`data-route`/`data-url`, and quoted root-relative paths inside
/// `onclick` handlers. Domain filtering is left to the frontier.
pub fn extract_links(doc: &Document, base: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut push = |u: Url| {
        if seen.insert(u.as_str().to_string()) {
            out.push(u);
        }
    };

    for el in doc.elements() {
        let is_link_tag = el.tag_name() == "link";
        for attr in ROUTE_ATTRS {
            if *attr == "href" && is_link_tag {
                continue;
            }
            if let Some(u) = el.attr(attr).and_then(|v| resolve_reference(base, &v)) {
                push(u);
            }
        }
        if let Some(handler) = el.attr("onclick") {
            for cap in onclick_path_pattern().captures_iter(&handler) {
                if let Some(u) = resolve_reference(base, &cap[1]) {
                    push(u);
                }
            }
        }
    }
    out
}
