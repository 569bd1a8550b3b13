use std::cell::RefCell;
use std::fs;
use std::rc::Rc;

use anyhow::Context;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::types::Heading;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Finds the headings of a built page that can appear in the sidebar.
///
/// Only `<h2>`–`<h6>` inside the first `<main>` qualify, and only when they
/// carry an `id` and their first child element is the anchor link the book
/// generator emits. Labels keep the anchor's inline markup, minus `<mark>`
/// wrappers left behind by search highlighting.
pub struct HeadingScanner;

impl HeadingScanner {
    pub fn scan_file(path: &str) -> anyhow::Result<Vec<Heading>> {
        let html = fs::read_to_string(path).with_context(|| format!("Failed to read {path}"))?;
        Ok(Self::scan(&html))
    }

    pub fn scan(html: &str) -> Vec<Heading> {
        let dom = match parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())
        {
            Ok(dom) => dom,
            Err(e) => {
                log::warn!("Failed to parse page HTML: {e}");
                return Vec::new();
            }
        };

        let Some(main) = Self::find_element(&dom.document, "main") else {
            log::debug!("Page has no <main>; no headings to track");
            return Vec::new();
        };

        let mut headings = Vec::new();
        Self::collect_headings(&main, &mut headings);
        log::debug!("Found {} qualifying headings", headings.len());
        headings
    }

    fn find_element(node: &Handle, tag: &str) -> Option<Handle> {
        if let NodeData::Element { ref name, .. } = node.data {
            if name.local.as_ref() == tag {
                return Some(node.clone());
            }
        }
        node.children
            .borrow()
            .iter()
            .find_map(|child| Self::find_element(child, tag))
    }

    fn collect_headings(node: &Handle, headings: &mut Vec<Heading>) {
        for child in node.children.borrow().iter() {
            if let NodeData::Element {
                ref name,
                ref attrs,
                ..
            } = child.data
            {
                let tag = name.local.as_ref();
                if matches!(tag, "h2" | "h3" | "h4" | "h5" | "h6") {
                    if let Some(heading) = Self::qualify(tag, attrs, child) {
                        headings.push(heading);
                    }
                    continue;
                }
            }
            Self::collect_headings(child, headings);
        }
    }

    fn qualify(
        tag: &str,
        attrs: &RefCell<Vec<html5ever::Attribute>>,
        node: &Handle,
    ) -> Option<Heading> {
        let level = Heading::level_from_tag(tag)?;
        let id = Self::get_attr_value(attrs, "id").filter(|id| !id.is_empty())?;

        let first_element = node
            .children
            .borrow()
            .iter()
            .find(|child| matches!(child.data, NodeData::Element { .. }))
            .cloned()?;
        let is_anchor = matches!(
            first_element.data,
            NodeData::Element { ref name, .. } if name.local.as_ref() == "a"
        );
        if !is_anchor {
            return None;
        }

        let mut label_html = String::new();
        for child in first_element.children.borrow().iter() {
            Self::serialize_label(child, &mut label_html);
        }
        Some(Heading::new(level, id, label_html))
    }

    fn get_attr_value(attrs: &RefCell<Vec<html5ever::Attribute>>, name: &str) -> Option<String> {
        attrs
            .borrow()
            .iter()
            .find(|attr| attr.name.local.as_ref() == name)
            .map(|attr| attr.value.to_string())
    }

    fn serialize_label(node: &Rc<markup5ever_rcdom::Node>, html: &mut String) {
        match node.data {
            NodeData::Text { ref contents } => {
                let text = contents.borrow();
                let text: &str = &text;
                html.push_str(&html_escape::encode_text(text));
            }
            NodeData::Element {
                ref name,
                ref attrs,
                ..
            } => {
                let tag = name.local.as_ref();
                if tag == "mark" {
                    for child in node.children.borrow().iter() {
                        Self::serialize_label(child, html);
                    }
                    return;
                }

                html.push('<');
                html.push_str(tag);
                for attr in attrs.borrow().iter() {
                    html.push(' ');
                    html.push_str(&attr.name.local);
                    html.push_str("=\"");
                    html.push_str(&html_escape::encode_double_quoted_attribute(&*attr.value));
                    html.push('"');
                }
                html.push('>');

                if VOID_ELEMENTS.contains(&tag) {
                    return;
                }
                for child in node.children.borrow().iter() {
                    Self::serialize_label(child, html);
                }
                html.push_str("</");
                html.push_str(tag);
                html.push('>');
            }
            _ => {}
        }
    }
}
