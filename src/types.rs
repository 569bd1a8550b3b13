use serde::{Deserialize, Serialize};

/// A qualifying in-page heading, captured once per page load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Heading depth, 2 for `<h2>` through 6 for `<h6>`
    pub level: u8,
    pub id: String,
    /// Inner markup of the heading's anchor with `<mark>` wrappers unwrapped
    pub label_html: String,
}

impl Heading {
    pub fn new(level: u8, id: impl Into<String>, label_html: impl Into<String>) -> Self {
        Self {
            level,
            id: id.into(),
            label_html: label_html.into(),
        }
    }

    /// Fragment link used by the sidebar entry
    pub fn href(&self) -> String {
        format!("#{}", self.id)
    }

    /// Level parsed from a tag name such as `h3`
    pub fn level_from_tag(tag: &str) -> Option<u8> {
        let mut chars = tag.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some('h' | 'H'), Some(digit), None) => {
                digit.to_digit(10).map(|d| d as u8).filter(|d| (1..=6).contains(d))
            }
            _ => None,
        }
    }
}

/// Live position of a heading relative to the viewport top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadingRect {
    pub top: f64,
    pub bottom: f64,
}

impl HeadingRect {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }
}

/// Scroll geometry sampled on every scroll, resize or load event.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub window_height: f64,
    pub document_height: f64,
}

impl ScrollMetrics {
    pub fn new(scroll_top: f64, window_height: f64, document_height: f64) -> Self {
        Self {
            scroll_top,
            window_height,
            document_height,
        }
    }

    /// Whole document fits in the viewport
    pub fn fits_in_viewport(&self) -> bool {
        self.document_height <= self.window_height
    }
}
