//! Parsed HTML documents: element walking, attribute rewriting, serialization.
//!
//! Thin layer over an html5ever `RcDom`. The engine only needs "has links and
//! asset references"; nothing here assumes a particular app's markup.

pub mod heuristics;
mod links;

use html5ever::serialize::{SerializeOpts, TraversalScope};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{parse_document, Attribute, LocalName, Namespace, ParseOpts, QualName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::io;
use std::rc::Rc;

pub use links::extract_links;

/// A parsed, mutable HTML document.
pub struct Document {
    dom: RcDom,
}

impl Document {
    /// Parses markup with html5ever's error-recovering tree builder.
    pub fn parse(html: &str) -> Document {
        let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
        Document { dom }
    }

    /// Serializes the whole document (doctype included) back to markup.
    pub fn to_html(&self) -> io::Result<String> {
        let mut out = Vec::new();
        let handle: SerializableHandle = self.dom.document.clone().into();
        let opts = SerializeOpts {
            traversal_scope: TraversalScope::ChildrenOnly(None),
            ..Default::default()
        };
        html5ever::serialize::serialize(&mut out, &handle, opts)?;
        String::from_utf8(out).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// All elements in document (pre-)order.
    pub fn elements(&self) -> Vec<Element> {
        self.elements_outside(&[])
    }

    /// Elements in document order, leaving out every element named in
    /// `skip` together with its whole subtree.
    pub fn elements_outside(&self, skip: &[&str]) -> Vec<Element> {
        let mut out = Vec::new();
        let mut stack = vec![self.dom.document.clone()];
        while let Some(node) = stack.pop() {
            if let NodeData::Element { name, .. } = &node.data {
                if skip.contains(&&*name.local) {
                    continue;
                }
                out.push(Element(node.clone()));
            }
            for child in node.children.borrow().iter().rev() {
                stack.push(child.clone());
            }
        }
        out
    }

    /// Elements with the given (lower-case) tag name, in document order.
    pub fn elements_named(&self, tag: &str) -> Vec<Element> {
        self.elements()
            .into_iter()
            .filter(|e| e.tag_name() == tag)
            .collect()
    }

    /// Whitespace-normalized text of the first `<title>`, if non-empty.
    pub fn title(&self) -> Option<String> {
        self.elements_named("title")
            .first()
            .map(Element::text)
            .filter(|t| !t.is_empty())
    }
}

/// Handle to one element node of a [`Document`].
#[derive(Clone)]
pub struct Element(Handle);

impl Element {
    pub fn tag_name(&self) -> &str {
        match &self.0.data {
            NodeData::Element { name, .. } => &*name.local,
            _ => "",
        }
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.0.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|a| &*a.name.local == name)
                .map(|a| a.value.to_string()),
            _ => None,
        }
    }

    /// Sets (or adds) an attribute value.
    pub fn set_attr(&self, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &self.0.data {
            let mut attrs = attrs.borrow_mut();
            match attrs.iter_mut().find(|a| &*a.name.local == name) {
                Some(a) => a.value = StrTendril::from(value),
                None => attrs.push(Attribute {
                    name: QualName::new(None, Namespace::from(""), LocalName::from(name)),
                    value: StrTendril::from(value),
                }),
            }
        }
    }

    /// Whitespace-separated tokens of an attribute, lower-cased (e.g. `rel`).
    pub fn attr_tokens(&self, name: &str) -> Vec<String> {
        self.attr(name)
            .map(|v| v.split_whitespace().map(str::to_ascii_lowercase).collect())
            .unwrap_or_default()
    }

    /// Descendant text with whitespace runs collapsed to single spaces.
    pub fn text(&self) -> String {
        let mut raw = String::new();
        collect_text(&self.0, &mut raw);
        raw.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Concatenated direct text children, unmodified (e.g. a `<style>` body).
    pub fn raw_text(&self) -> String {
        let mut out = String::new();
        for child in self.0.children.borrow().iter() {
            if let NodeData::Text { contents } = &child.data {
                out.push_str(&contents.borrow());
            }
        }
        out
    }

    /// Replaces the direct text children with `text`: the first text child
    /// takes the new content and any further ones are emptied.
    pub fn set_raw_text(&self, text: &str) {
        let mut first = true;
        for child in self.0.children.borrow().iter() {
            if let NodeData::Text { contents } = &child.data {
                let value = if first { text } else { "" };
                *contents.borrow_mut() = StrTendril::from(value);
                first = false;
            }
        }
    }

    /// Child elements in order.
    pub fn child_elements(&self) -> Vec<Element> {
        self.0
            .children
            .borrow()
            .iter()
            .filter(|c| matches!(c.data, NodeData::Element { .. }))
            .map(|c| Element(c.clone()))
            .collect()
    }

    pub fn same_node(&self, other: &Element) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

fn collect_text(node: &Handle, out: &mut String) {
    for child in node.children.borrow().iter() {
        match &child.data {
            NodeData::Text { contents } => {
                out.push_str(&contents.borrow());
                out.push(' ');
            }
            NodeData::Element { .. } => collect_text(child, out),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<!DOCTYPE html>
<html><head><title>  My
  Tasks </title>
<link rel="stylesheet" href="/static/app.css">
<style>body { background: url("/img/bg.png"); }</style>
</head>
<body><a href="/0/inbox">Inbox <b>(3)</b></a><img src="logo.png"></body></html>"#;

    #[test]
    fn title_is_normalized() {
        let doc = Document::parse(PAGE);
        assert_eq!(doc.title().as_deref(), Some("My Tasks"));
        assert!(Document::parse("<p>no title</p>").title().is_none());
    }

    #[test]
    fn elements_in_document_order() {
        let doc = Document::parse(PAGE);
        let names: Vec<String> = doc.elements().iter().map(|e| e.tag_name().to_string()).collect();
        let pos = |n: &str| names.iter().position(|x| x == n).unwrap();
        assert!(pos("html") < pos("head"));
        assert!(pos("link") < pos("style"));
        assert!(pos("a") < pos("b"));
        assert!(pos("b") < pos("img"));
    }

    #[test]
    fn elements_outside_prunes_subtrees() {
        let doc = Document::parse(PAGE);
        let names: Vec<String> = doc
            .elements_outside(&["head"])
            .iter()
            .map(|e| e.tag_name().to_string())
            .collect();
        assert_eq!(names, vec!["html", "body", "a", "b", "img"]);
    }

    #[test]
    fn attributes_and_text() {
        let doc = Document::parse(PAGE);
        let a = &doc.elements_named("a")[0];
        assert_eq!(a.attr("href").as_deref(), Some("/0/inbox"));
        assert_eq!(a.text(), "Inbox (3)");
        let link = &doc.elements_named("link")[0];
        assert_eq!(link.attr_tokens("rel"), vec!["stylesheet".to_string()]);
    }

    #[test]
    fn rewrites_survive_serialization() {
        let doc = Document::parse(PAGE);
        let img = &doc.elements_named("img")[0];
        img.set_attr("src", "home/assets/app_example_com__logo.png");
        img.set_attr("alt", "logo");
        let style = &doc.elements_named("style")[0];
        style.set_raw_text("body { background: url(\"home/assets/bg.png\"); }");

        let html = doc.to_html().unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"src="home/assets/app_example_com__logo.png""#));
        assert!(html.contains(r#"alt="logo""#));
        assert!(html.contains(r#"url("home/assets/bg.png")"#));

        let reparsed = Document::parse(&html);
        assert_eq!(reparsed.title().as_deref(), Some("My Tasks"));
    }
}
