//! Virtual horizontal line deciding which heading counts as "passed".
//!
//! The line sits `down_threshold` px below the viewport top while scrolling
//! down and relaxes towards `up_threshold` while scrolling up, so the current
//! header does not flicker when the reader changes direction. Near the bottom
//! of the document the line is pushed down, otherwise the last headings could
//! never cross it.

use crate::config::NavConfig;
use crate::types::ScrollMetrics;
use serde::Serialize;

/// Intermediate values of the last threshold computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThresholdDebug {
    pub document_height: f64,
    pub window_height: f64,
    pub scroll_top: f64,
    pub pixels_above: f64,
    pub pixels_below: f64,
    pub bottom_add: f64,
    pub adjusted_bottom_add: f64,
    pub scrolling_down: bool,
    pub threshold: f64,
}

impl ThresholdDebug {
    /// Label/value pairs in display order
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        vec![
            ("documentHeight", format!("{:.1}", self.document_height)),
            ("windowHeight", format!("{:.1}", self.window_height)),
            ("scrollTop", format!("{:.1}", self.scroll_top)),
            ("pixelsAbove", format!("{:.1}", self.pixels_above)),
            ("pixelsBelow", format!("{:.1}", self.pixels_below)),
            ("bottomAdd", format!("{:.1}", self.bottom_add)),
            ("adjustedBottomAdd", format!("{:.1}", self.adjusted_bottom_add)),
            ("scrollingDown", self.scrolling_down.to_string()),
            ("threshold", format!("{:.1}", self.threshold)),
        ]
    }
}

pub struct ThresholdTracker {
    down_default: f64,
    up_default: f64,
    threshold: f64,
    last_scroll_top: f64,
    debug_enabled: bool,
    last_debug: Option<ThresholdDebug>,
}

impl ThresholdTracker {
    pub fn new(config: &NavConfig) -> Self {
        Self {
            down_default: config.down_threshold,
            up_default: config.up_threshold,
            threshold: config.down_threshold,
            last_scroll_top: 0.0,
            debug_enabled: false,
            last_debug: None,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn last_scroll_top(&self) -> f64 {
        self.last_scroll_top
    }

    /// Places the line at an explicit position, e.g. the bottom edge of a clicked header
    pub fn force(&mut self, threshold: f64) {
        self.threshold = threshold;
    }

    pub fn enable_debug(&mut self) {
        self.debug_enabled = true;
    }

    pub fn debug_enabled(&self) -> bool {
        self.debug_enabled
    }

    /// Snapshot of the last update, recorded only while debugging is enabled
    pub fn last_debug(&self) -> Option<&ThresholdDebug> {
        self.last_debug.as_ref()
    }

    /// Recomputes the threshold from the current scroll geometry
    pub fn update(&mut self, metrics: &ScrollMetrics) -> f64 {
        let ScrollMetrics {
            scroll_top,
            window_height,
            document_height,
        } = *metrics;

        let pixels_below = (document_height - (scroll_top + window_height)).max(0.0);
        let pixels_above = (self.down_default - scroll_top).max(0.0);
        let bottom_add = (window_height - pixels_below - self.down_default).max(0.0);

        // The bottom correction assumes at least two viewports of content.
        let mut adjusted_bottom_add = bottom_add;
        if document_height < window_height * 2.0 {
            let max_pixels_below = document_height - window_height;
            let t = 1.0 - pixels_below / max_pixels_below.max(1.0);
            adjusted_bottom_add *= t.clamp(0.0, 1.0);
        }

        let scrolling_down = scroll_top >= self.last_scroll_top;
        if scrolling_down {
            let amount_scrolled_down = scroll_top - self.last_scroll_top;
            let adjusted_default = self.down_default + adjusted_bottom_add;
            self.threshold = adjusted_default.max(self.threshold - amount_scrolled_down);
        } else {
            let amount_scrolled_up = self.last_scroll_top - scroll_top;
            let adjusted_default = self.up_default - pixels_above
                + (adjusted_bottom_add - self.down_default).max(0.0);
            self.threshold = adjusted_default.min(self.threshold + amount_scrolled_up);
        }

        if metrics.fits_in_viewport() {
            self.threshold = 0.0;
        }

        if self.debug_enabled {
            self.last_debug = Some(ThresholdDebug {
                document_height,
                window_height,
                scroll_top,
                pixels_above,
                pixels_below,
                bottom_add,
                adjusted_bottom_add,
                scrolling_down,
                threshold: self.threshold,
            });
        }

        self.last_scroll_top = scroll_top;
        self.threshold
    }
}
