//! Keeps the sidebar at the same relative position across page loads.
//!
//! Clicking a chapter link stores the link's offset from the sidebar top in
//! session storage. The next page reads and deletes it, then scrolls the
//! sidebar so its active entry sits at that offset again. Without a stored
//! offset (e.g. "next chapter" buttons) the active entry is centred.

use std::collections::HashMap;

/// Session-scoped key/value storage. Failures are swallowed by implementors.
pub trait SessionStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str);
    fn remove(&mut self, key: &str);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.items.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.items.insert(key.to_string(), value.to_string());
    }

    fn remove(&mut self, key: &str) {
        self.items.remove(key);
    }
}

/// Geometry of the active sidebar entry on the new page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEntry {
    /// Top of the active entry in viewport coordinates
    pub entry_top: f64,
    /// Top of the sidebar scroll box in viewport coordinates
    pub sidebar_top: f64,
    /// Current `scrollTop` of the sidebar
    pub scroll_top: f64,
}

impl ActiveEntry {
    pub fn offset(&self) -> f64 {
        self.entry_top - self.sidebar_top
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SidebarRestore {
    /// Set the sidebar's `scrollTop` to this value
    ScrollTo(f64),
    /// Scroll the active entry into the middle of the sidebar
    CenterActive,
}

pub struct SidebarScrollMemory {
    key: String,
}

impl SidebarScrollMemory {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn remember_click(&self, store: &mut dyn SessionStore, link_top: f64, sidebar_top: f64) {
        let offset = link_top - sidebar_top;
        store.set(&self.key, &offset.to_string());
    }

    /// Reads and deletes the stored offset
    pub fn take_saved_offset(&self, store: &mut dyn SessionStore) -> Option<f64> {
        let raw = store.get(&self.key)?;
        store.remove(&self.key);
        match raw.trim().parse::<f64>() {
            Ok(offset) if offset.is_finite() => Some(offset),
            _ => {
                log::warn!("Discarding unparsable sidebar offset {raw:?}");
                None
            }
        }
    }

    /// Decides how to position the sidebar on page load.
    pub fn restore(
        &self,
        store: &mut dyn SessionStore,
        active: Option<ActiveEntry>,
    ) -> Option<SidebarRestore> {
        let saved = self.take_saved_offset(store);
        let active = active?;
        match saved {
            Some(saved) => {
                let scroll_top = active.scroll_top + active.offset() - saved;
                log::debug!("Restoring sidebar offset {saved}: scrollTop -> {scroll_top}");
                Some(SidebarRestore::ScrollTo(scroll_top))
            }
            None => Some(SidebarRestore::CenterActive),
        }
    }
}
