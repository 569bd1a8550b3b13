//! The single navigation state object handed to every event handler.
//!
//! Handlers are plain methods; whatever drives them (the DOM adapter, the
//! trace replayer, tests) owns timers and animation frames and reports back
//! through [`NavigationState::on_suppression_timeout`] and
//! [`NavigationState::on_animation_frame`].

use std::time::Duration;

use crate::config::NavConfig;
use crate::header_tree::{HeaderTree, NodeId};
use crate::resolver::{PageLayout, update_current_header};
use crate::sidebar_scroll::SidebarScrollMemory;
use crate::suppression::ScrollSuppression;
use crate::threshold::{ThresholdDebug, ThresholdTracker};
use crate::types::Heading;

/// What the driver must schedule after a header click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressionTimer {
    pub generation: u64,
    pub delay: Duration,
}

pub struct NavigationState {
    config: NavConfig,
    tracker: ThresholdTracker,
    suppression: ScrollSuppression,
    sidebar_memory: SidebarScrollMemory,
    tree: Option<HeaderTree>,
    tree_built: bool,
}

impl NavigationState {
    pub fn new(config: NavConfig) -> Self {
        Self {
            tracker: ThresholdTracker::new(&config),
            suppression: ScrollSuppression::new(Duration::from_millis(config.suppression_ms)),
            sidebar_memory: SidebarScrollMemory::new(config.scroll_offset_key.clone()),
            tree: None,
            tree_built: false,
            config,
        }
    }

    pub fn config(&self) -> &NavConfig {
        &self.config
    }

    pub fn tree(&self) -> Option<&HeaderTree> {
        self.tree.as_ref()
    }

    pub fn threshold(&self) -> f64 {
        self.tracker.threshold()
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppression.is_suppressed()
    }

    pub fn sidebar_memory(&self) -> &SidebarScrollMemory {
        &self.sidebar_memory
    }

    pub fn current_heading(&self) -> Option<&Heading> {
        self.tree.as_ref().and_then(HeaderTree::current_heading)
    }

    pub fn threshold_debug(&self) -> Option<&ThresholdDebug> {
        self.tracker.last_debug()
    }

    /// Builds the header tree. Only the first call has an effect.
    pub fn install_headings(&mut self, headings: Vec<Heading>) -> bool {
        if self.tree_built {
            log::warn!("Header tree already built for this page; ignoring rescan");
            return false;
        }
        self.tree_built = true;
        self.tree = HeaderTree::build(headings, self.config.fold_level);
        self.tree.is_some()
    }

    /// Page-load handler: build the tree, then place the threshold and current header
    pub fn on_load(&mut self, headings: Vec<Heading>, layout: &dyn PageLayout) -> Option<usize> {
        self.install_headings(headings);
        self.on_scroll(layout)
    }

    /// Scroll and resize handler. No-op while a sidebar click is settling.
    pub fn on_scroll(&mut self, layout: &dyn PageLayout) -> Option<usize> {
        if self.suppression.is_suppressed() {
            return self.tree.as_ref().and_then(HeaderTree::current);
        }
        let threshold = self.tracker.update(&layout.metrics());
        let tree = self.tree.as_mut()?;
        update_current_header(tree, threshold, layout)
    }

    /// Sidebar header link handler. The returned timer must be reported back
    /// through [`Self::on_suppression_timeout`] once its delay has elapsed.
    pub fn on_header_click(&mut self, heading_id: &str) -> SuppressionTimer {
        let target = self
            .tree
            .as_ref()
            .and_then(|tree| tree.heading_index_by_id(heading_id));
        if target.is_none() {
            log::debug!("Clicked header #{heading_id} is not tracked");
        }
        SuppressionTimer {
            generation: self.suppression.arm(target),
            delay: self.suppression.window(),
        }
    }

    pub fn on_suppression_timeout(&mut self, generation: u64) -> bool {
        self.suppression.release(generation)
    }

    /// Animation-frame handler. Once a clicked header has settled, the
    /// threshold is moved to its bottom edge so it becomes current.
    pub fn on_animation_frame(&mut self, layout: &dyn PageLayout) -> Option<usize> {
        let index = self.suppression.on_animation_frame()?;
        let rect = layout.heading_rect(index)?;
        self.tracker.force(rect.bottom);
        let tree = self.tree.as_mut()?;
        update_current_header(tree, rect.bottom, layout)
    }

    /// Fold toggle handler for sidebar header entries
    pub fn toggle(&mut self, node: NodeId) -> bool {
        self.tree.as_mut().is_some_and(|tree| tree.toggle(node))
    }

    /// Turns on the threshold overlay and returns its first snapshot
    pub fn enable_threshold_debug(&mut self, layout: &dyn PageLayout) -> Option<ThresholdDebug> {
        self.tracker.enable_debug();
        self.tracker.update(&layout.metrics());
        self.tracker.last_debug().copied()
    }
}
