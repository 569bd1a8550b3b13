use crate::header_tree::HeaderTree;
use crate::types::{HeadingRect, ScrollMetrics};

/// Live layout of the page: scroll geometry and heading positions.
///
/// Implemented over the browser DOM in the wasm build and by
/// [`crate::simulation::SimulatedPage`] elsewhere.
pub trait PageLayout {
    fn metrics(&self) -> ScrollMetrics;

    /// Position of the heading at `index` relative to the viewport top
    fn heading_rect(&self, index: usize) -> Option<HeadingRect>;
}

/// Picks the heading that should be current for the given threshold.
///
/// Headings are in document order, so the scan stops at the first one below
/// the line. When none has crossed it the first heading is used, unless it
/// is still below the viewport.
pub fn pick_current(
    threshold: f64,
    heading_count: usize,
    layout: &dyn PageLayout,
) -> Option<usize> {
    let mut last_passed = None;
    for index in 0..heading_count {
        let Some(rect) = layout.heading_rect(index) else {
            continue;
        };
        if rect.top <= threshold {
            last_passed = Some(index);
        } else {
            break;
        }
    }

    if last_passed.is_some() {
        return last_passed;
    }

    let first = layout.heading_rect(0)?;
    if first.top >= layout.metrics().window_height {
        return None;
    }
    Some(0)
}

/// Reflects the current heading in the tree's marked state.
///
/// Previous resolver state is cleared first, so nothing stays marked when the
/// reader is above all content. Returns the index of the current heading.
pub fn update_current_header(
    tree: &mut HeaderTree,
    threshold: f64,
    layout: &dyn PageLayout,
) -> Option<usize> {
    let previous = tree.current();
    tree.clear_resolver_state();

    let current = pick_current(threshold, tree.headings().len(), layout)?;
    tree.mark_current(current);

    if previous != Some(current) {
        log::debug!(
            "Current header: {:?} -> #{} (threshold {threshold:.1})",
            previous,
            tree.headings()[current].id
        );
    }
    Some(current)
}
