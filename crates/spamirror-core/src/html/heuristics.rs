//! Ordered element heuristics for the pre-login screens.
//!
//! Each list is plain data evaluated top to bottom against a parsed
//! document; the first matcher that finds an element wins. Browser backends
//! receive the resulting [`ElementTarget`], which carries both the concrete
//! element facts (tag, position, href) and a selector hint for engines that
//! resolve elements themselves.

use super::{Document, Element};

/// Elements whose text never counts as visible UI text.
const NON_VISUAL_TAGS: &[&str] = &["head", "title", "script", "style", "noscript", "template"];

/// One way of recognizing an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementMatcher {
    /// `tag` whose text contains `text`, ignoring case.
    TagContainsText { tag: &'static str, text: &'static str },
    /// Innermost element whose normalized text equals `text` exactly.
    ExactText(&'static str),
    /// `tag` whose `attr` contains `needle`, ignoring case.
    AttrContains {
        tag: &'static str,
        attr: &'static str,
        needle: &'static str,
    },
    /// `tag` whose `attr` equals `value`, ignoring ASCII case.
    AttrEquals {
        tag: &'static str,
        attr: &'static str,
        value: &'static str,
    },
}

/// Login links or buttons on a landing page.
pub const LOGIN_REVEAL: &[ElementMatcher] = &[
    ElementMatcher::TagContainsText { tag: "a", text: "Log in" },
    ElementMatcher::TagContainsText { tag: "a", text: "Log In" },
    ElementMatcher::TagContainsText { tag: "a", text: "Sign in" },
    ElementMatcher::ExactText("Log in"),
    ElementMatcher::ExactText("Log In"),
    ElementMatcher::ExactText("Sign in"),
    ElementMatcher::ExactText("Sign In"),
    ElementMatcher::AttrContains { tag: "a", attr: "href", needle: "/-/login" },
    ElementMatcher::AttrContains { tag: "a", attr: "href", needle: "login" },
];

/// The email field of a login form.
pub const EMAIL_INPUT: &[ElementMatcher] = &[
    ElementMatcher::AttrEquals { tag: "input", attr: "type", value: "email" },
    ElementMatcher::AttrEquals { tag: "input", attr: "name", value: "email" },
    ElementMatcher::AttrContains { tag: "input", attr: "placeholder", needle: "email" },
];

/// Buttons that advance a login form to its next screen.
pub const ADVANCE_BUTTON: &[ElementMatcher] = &[
    ElementMatcher::TagContainsText { tag: "button", text: "Continue" },
    ElementMatcher::TagContainsText { tag: "button", text: "Next" },
    ElementMatcher::TagContainsText { tag: "button", text: "Log in" },
    ElementMatcher::TagContainsText { tag: "button", text: "Sign in" },
];

/// Syntactically valid address used to push a login form forward.
pub const PLACEHOLDER_EMAIL: &str = "example@example.com";

impl ElementMatcher {
    /// Playwright-style selector equivalent of this matcher.
    pub fn selector_hint(&self) -> String {
        match self {
            ElementMatcher::TagContainsText { tag, text } => format!("{}:has-text(\"{}\")", tag, text),
            ElementMatcher::ExactText(text) => format!("text=\"{}\"", text),
            ElementMatcher::AttrContains { tag, attr, needle } => {
                format!("{}[{}*=\"{}\" i]", tag, attr, needle)
            }
            ElementMatcher::AttrEquals { tag, attr, value } => format!("{}[{}=\"{}\" i]", tag, attr, value),
        }
    }

    fn matches(&self, el: &Element) -> bool {
        match self {
            ElementMatcher::TagContainsText { tag, text } => {
                el.tag_name() == *tag && el.text().to_lowercase().contains(&text.to_lowercase())
            }
            ElementMatcher::ExactText(text) => {
                !NON_VISUAL_TAGS.contains(&el.tag_name()) && el.text() == *text
            }
            ElementMatcher::AttrContains { tag, attr, needle } => {
                el.tag_name() == *tag
                    && el
                        .attr(attr)
                        .is_some_and(|v| v.to_lowercase().contains(&needle.to_lowercase()))
            }
            ElementMatcher::AttrEquals { tag, attr, value } => {
                el.tag_name() == *tag && el.attr(attr).is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
            }
        }
    }

    /// First matching element in document order, ignoring `<head>`.
    pub fn find(&self, doc: &Document) -> Option<Element> {
        let first = doc
            .elements_outside(&["head"])
            .into_iter()
            .find(|el| self.matches(el))?;
        if let ElementMatcher::ExactText(_) = self {
            return Some(innermost(self, first));
        }
        Some(first)
    }
}

/// Walks down to the deepest element that still matches (`<a><span>Log in</span></a>` → span).
fn innermost(matcher: &ElementMatcher, mut el: Element) -> Element {
    while let Some(child) = el.child_elements().into_iter().find(|c| matcher.matches(c)) {
        el = child;
    }
    el
}

/// An element picked by a heuristic, described for the browser backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementTarget {
    pub matcher: ElementMatcher,
    pub selector: String,
    pub tag: String,
    /// Position among elements with the same tag, in document order.
    pub ordinal: usize,
    pub href: Option<String>,
    pub text: String,
}

/// Evaluates `candidates` in order; the first matcher that finds an element wins.
pub fn find_first(doc: &Document, candidates: &[ElementMatcher]) -> Option<ElementTarget> {
    candidates.iter().find_map(|matcher| {
        let el = matcher.find(doc)?;
        let ordinal = doc
            .elements_named(el.tag_name())
            .iter()
            .position(|e| e.same_node(&el))
            .unwrap_or(0);
        Some(ElementTarget {
            matcher: *matcher,
            selector: matcher.selector_hint(),
            tag: el.tag_name().to_string(),
            ordinal,
            href: el.attr("href"),
            text: el.text(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn login_link_by_text() {
        let doc = Document::parse(
            r#"<nav><a href="/pricing">Pricing</a><a href="/-/login">Log in</a></nav>"#,
        );
        let t = find_first(&doc, LOGIN_REVEAL).unwrap();
        assert_eq!(t.tag, "a");
        assert_eq!(t.ordinal, 1);
        assert_eq!(t.href.as_deref(), Some("/-/login"));
        assert_eq!(t.selector, "a:has-text(\"Log in\")");
    }

    #[test]
    fn exact_text_picks_innermost_element() {
        let doc = Document::parse(r#"<div><button><span>Sign In</span></button></div>"#);
        let t = find_first(&doc, LOGIN_REVEAL).unwrap();
        assert_eq!(t.matcher, ElementMatcher::ExactText("Sign In"));
        assert_eq!(t.tag, "span");
    }

    #[test]
    fn falls_back_to_href_match() {
        let doc = Document::parse(r#"<a href="https://app.example.com/account/login?next=/">Account</a>"#);
        let t = find_first(&doc, LOGIN_REVEAL).unwrap();
        assert_eq!(
            t.matcher,
            ElementMatcher::AttrContains { tag: "a", attr: "href", needle: "login" }
        );
    }

    #[test]
    fn title_text_is_not_a_login_control() {
        let doc = Document::parse(r#"<html><head><title>Log in</title></head><body><p>Welcome</p></body></html>"#);
        assert!(find_first(&doc, LOGIN_REVEAL).is_none());
    }

    #[test]
    fn large_page_without_controls_is_scanned_in_linear_time() {
        let mut html = String::from("<html><head><title>Board</title></head><body>");
        for i in 0..8000 {
            html.push_str(&format!("<div><span>row {}</span></div>", i));
        }
        html.push_str("</body></html>");
        let doc = Document::parse(&html);

        let started = std::time::Instant::now();
        for list in [LOGIN_REVEAL, EMAIL_INPUT, ADVANCE_BUTTON] {
            assert!(find_first(&doc, list).is_none());
        }
        let elapsed = started.elapsed();
        assert!(elapsed < std::time::Duration::from_secs(10), "took {:?}", elapsed);
    }

    #[test]
    fn email_input_order() {
        let doc = Document::parse(
            r#"<form><input name="email" type="text"><input type="EMAIL" id="e"></form>"#,
        );
        let t = find_first(&doc, EMAIL_INPUT).unwrap();
        assert_eq!(t.matcher, EMAIL_INPUT[0]);
        assert_eq!(t.ordinal, 1);

        let doc = Document::parse(r#"<input placeholder="Your Email address">"#);
        let t = find_first(&doc, EMAIL_INPUT).unwrap();
        assert_eq!(t.matcher, EMAIL_INPUT[2]);
    }

    #[test]
    fn advance_button() {
        let doc = Document::parse(r#"<button>Back</button><button> Next step </button>"#);
        let t = find_first(&doc, ADVANCE_BUTTON).unwrap();
        assert_eq!(t.text, "Next step");
        assert_eq!(t.ordinal, 1);
        assert!(find_first(&Document::parse("<p>nothing</p>"), ADVANCE_BUTTON).is_none());
    }
}
