use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Storage, Window};

use crate::resolver::PageLayout;
use crate::sidebar_scroll::SessionStore;
use crate::types::{Heading, HeadingRect, ScrollMetrics};

/// Live layout read from the browser.
pub struct DomLayout {
    window: Window,
    document: Document,
    headings: Vec<Element>,
}

impl DomLayout {
    pub fn new(window: Window, document: Document, headings: Vec<Element>) -> Self {
        Self {
            window,
            document,
            headings,
        }
    }
}

impl PageLayout for DomLayout {
    fn metrics(&self) -> ScrollMetrics {
        let root = self.document.document_element();
        let scroll_top = match self.window.page_y_offset() {
            Ok(offset) if offset > 0.0 => offset,
            _ => root.as_ref().map(|el| el.scroll_top() as f64).unwrap_or(0.0),
        };
        let window_height = self
            .window
            .inner_height()
            .ok()
            .and_then(|height| height.as_f64())
            .unwrap_or(0.0);
        let document_height = root.map(|el| el.scroll_height() as f64).unwrap_or(0.0);
        ScrollMetrics::new(scroll_top, window_height, document_height)
    }

    fn heading_rect(&self, index: usize) -> Option<HeadingRect> {
        let rect = self.headings.get(index)?.get_bounding_client_rect();
        Some(HeadingRect::new(rect.top(), rect.bottom()))
    }
}

/// `sessionStorage`; unavailable storage (privacy modes, sandboxed frames) reads as empty.
pub struct SessionStorage {
    storage: Option<Storage>,
}

impl SessionStorage {
    pub fn new(window: &Window) -> Self {
        Self {
            storage: window.session_storage().ok().flatten(),
        }
    }
}

impl SessionStore for SessionStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok().flatten()
    }

    fn set(&mut self, key: &str, value: &str) {
        if let Some(storage) = &self.storage {
            if let Err(e) = storage.set_item(key, value) {
                log::debug!("sessionStorage.setItem failed: {e:?}");
            }
        }
    }

    fn remove(&mut self, key: &str) {
        if let Some(storage) = &self.storage {
            let _ = storage.remove_item(key);
        }
    }
}

/// Qualifying headings of `<main>` with their elements, in document order.
pub fn scan_headings(document: &Document) -> (Vec<Element>, Vec<Heading>) {
    let mut elements = Vec::new();
    let mut headings = Vec::new();

    let Some(main) = document.get_elements_by_tag_name("main").item(0) else {
        return (elements, headings);
    };
    let Ok(candidates) = main.query_selector_all("h2, h3, h4, h5, h6") else {
        return (elements, headings);
    };

    for i in 0..candidates.length() {
        let Some(element) = candidates
            .item(i)
            .and_then(|node| node.dyn_into::<Element>().ok())
        else {
            continue;
        };
        let id = element.id();
        if id.is_empty() {
            continue;
        }
        let Some(anchor) = element.first_element_child() else {
            continue;
        };
        if !anchor.tag_name().eq_ignore_ascii_case("a") {
            continue;
        }
        let Some(level) = Heading::level_from_tag(&element.tag_name()) else {
            continue;
        };
        let label_html = label_markup(&anchor).unwrap_or_else(|| anchor.inner_html());
        headings.push(Heading::new(level, id, label_html));
        elements.push(element);
    }
    (elements, headings)
}

/// Anchor markup with `<mark>` highlight wrappers replaced by their children
pub fn label_markup(anchor: &Element) -> Option<String> {
    let clone = anchor.clone_node_with_deep(true).ok()?.dyn_into::<Element>().ok()?;
    let marks = clone.query_selector_all("mark").ok()?;
    for i in 0..marks.length() {
        let Some(mark) = marks.item(i) else {
            continue;
        };
        let Some(parent) = mark.parent_node() else {
            continue;
        };
        while let Some(child) = mark.first_child() {
            parent.insert_before(&child, Some(&mark)).ok()?;
        }
        parent.remove_child(&mark).ok()?;
    }
    Some(clone.inner_html())
}

/// Value of a string global such as `path_to_root`
pub fn global_string(window: &Window, name: &str) -> Option<String> {
    js_sys::Reflect::get(window, &name.into())
        .ok()
        .and_then(|value| value.as_string())
}
