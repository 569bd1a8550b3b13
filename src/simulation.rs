//! Headless page model and scroll-trace replay.
//!
//! A built page carries no layout, so a trace describes it: viewport and
//! document height, where each heading sits in the document, and a list of
//! events to replay against [`NavigationState`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::NavConfig;
use crate::navigation::NavigationState;
use crate::resolver::PageLayout;
use crate::types::{Heading, HeadingRect, ScrollMetrics};

fn default_level() -> u8 {
    2
}

fn default_height() -> f64 {
    30.0
}

#[derive(Debug, Error, PartialEq)]
pub enum ReplayError {
    #[error("trace does not describe heading #{0}")]
    MissingLayout(String),
    #[error("click on unknown heading #{0}")]
    UnknownHeading(String),
    #[error("page has no qualifying headings")]
    NoHeadings,
    #[error("heading #{id} has level {level}, expected 2 to 6")]
    InvalidLevel { id: String, level: u8 },
}

/// A heading's box in document coordinates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceHeading {
    pub id: String,
    #[serde(default = "default_level")]
    pub level: u8,
    #[serde(default)]
    pub label: Option<String>,
    /// Distance from the document top
    pub offset: f64,
    #[serde(default = "default_height")]
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TraceEvent {
    Scroll { top: f64 },
    Resize { window_height: f64 },
    /// Sidebar click on a header link; the page then jumps to the heading
    Click { id: String },
    /// Let time pass, firing due timers
    Wait { ms: u64 },
    /// One animation frame
    Frame,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrollTrace {
    pub window_height: f64,
    pub document_height: f64,
    #[serde(default)]
    pub headings: Vec<TraceHeading>,
    #[serde(default)]
    pub events: Vec<TraceEvent>,
}

impl ScrollTrace {
    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    /// Headings described by the trace itself, for pages without HTML
    pub fn headings(&self) -> Result<Vec<Heading>, ReplayError> {
        self.headings
            .iter()
            .map(|heading| {
                if !(2..=6).contains(&heading.level) {
                    return Err(ReplayError::InvalidLevel {
                        id: heading.id.clone(),
                        level: heading.level,
                    });
                }
                let label = heading.label.clone().unwrap_or_else(|| heading.id.clone());
                Ok(Heading::new(heading.level, heading.id.clone(), label))
            })
            .collect()
    }
}

/// In-memory page implementing [`PageLayout`].
#[derive(Debug, Clone)]
pub struct SimulatedPage {
    boxes: Vec<(String, f64, f64)>,
    scroll_top: f64,
    window_height: f64,
    document_height: f64,
}

impl SimulatedPage {
    /// Lays out `headings` using the boxes of the trace, matched by id
    pub fn new(
        headings: &[Heading],
        boxes: &[TraceHeading],
        window_height: f64,
        document_height: f64,
    ) -> Result<Self, ReplayError> {
        let boxes = headings
            .iter()
            .map(|heading| {
                boxes
                    .iter()
                    .find(|b| b.id == heading.id)
                    .map(|b| (b.id.clone(), b.offset, b.height))
                    .ok_or_else(|| ReplayError::MissingLayout(heading.id.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            boxes,
            scroll_top: 0.0,
            window_height,
            document_height,
        })
    }

    pub fn max_scroll(&self) -> f64 {
        (self.document_height - self.window_height).max(0.0)
    }

    pub fn scroll_to(&mut self, top: f64) {
        self.scroll_top = top.clamp(0.0, self.max_scroll());
    }

    pub fn resize(&mut self, window_height: f64) {
        self.window_height = window_height;
        self.scroll_to(self.scroll_top);
    }

    /// Jumps like an anchor navigation: heading at the viewport top if possible
    pub fn scroll_to_heading(&mut self, id: &str) -> bool {
        match self.boxes.iter().find(|(box_id, _, _)| box_id == id) {
            Some((_, offset, _)) => {
                let offset = *offset;
                self.scroll_to(offset);
                true
            }
            None => false,
        }
    }

    pub fn scroll_top(&self) -> f64 {
        self.scroll_top
    }
}

impl PageLayout for SimulatedPage {
    fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::new(self.scroll_top, self.window_height, self.document_height)
    }

    fn heading_rect(&self, index: usize) -> Option<HeadingRect> {
        self.boxes.get(index).map(|(_, offset, height)| {
            let top = offset - self.scroll_top;
            HeadingRect::new(top, top + height)
        })
    }
}

/// State after one replayed event.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayStep {
    pub at_ms: u64,
    pub event: String,
    pub scroll_top: f64,
    pub threshold: f64,
    pub suppressed: bool,
    pub current: Option<String>,
}

/// Drives a [`NavigationState`] with simulated time, timers and frames.
pub struct Replay {
    state: NavigationState,
    page: SimulatedPage,
    now: Duration,
    timers: Vec<(Duration, u64)>,
    steps: Vec<ReplayStep>,
}

impl Replay {
    pub fn new(
        config: NavConfig,
        headings: Vec<Heading>,
        trace: &ScrollTrace,
    ) -> Result<Self, ReplayError> {
        if headings.is_empty() {
            return Err(ReplayError::NoHeadings);
        }
        let page = SimulatedPage::new(
            &headings,
            &trace.headings,
            trace.window_height,
            trace.document_height,
        )?;
        let mut state = NavigationState::new(config);
        state.on_load(headings, &page);

        let mut replay = Self {
            state,
            page,
            now: Duration::ZERO,
            timers: Vec::new(),
            steps: Vec::new(),
        };
        replay.record("load".to_string());
        Ok(replay)
    }

    pub fn state(&self) -> &NavigationState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut NavigationState {
        &mut self.state
    }

    pub fn page(&self) -> &SimulatedPage {
        &self.page
    }

    pub fn steps(&self) -> &[ReplayStep] {
        &self.steps
    }

    pub fn current_id(&self) -> Option<&str> {
        self.state.current_heading().map(|heading| heading.id.as_str())
    }

    pub fn run(&mut self, events: &[TraceEvent]) -> Result<(), ReplayError> {
        for event in events {
            self.apply(event)?;
        }
        Ok(())
    }

    pub fn apply(&mut self, event: &TraceEvent) -> Result<(), ReplayError> {
        let label = match event {
            TraceEvent::Scroll { top } => {
                self.page.scroll_to(*top);
                self.state.on_scroll(&self.page);
                format!("scroll {top}")
            }
            TraceEvent::Resize { window_height } => {
                self.page.resize(*window_height);
                self.state.on_scroll(&self.page);
                format!("resize {window_height}")
            }
            TraceEvent::Click { id } => {
                if !self.page.scroll_to_heading(id) {
                    return Err(ReplayError::UnknownHeading(id.clone()));
                }
                let timer = self.state.on_header_click(id);
                self.timers.push((self.now + timer.delay, timer.generation));
                // The jump's scroll event lands inside the new window
                self.state.on_scroll(&self.page);
                format!("click #{id}")
            }
            TraceEvent::Wait { ms } => {
                self.advance(Duration::from_millis(*ms));
                format!("wait {ms}ms")
            }
            TraceEvent::Frame => {
                self.state.on_animation_frame(&self.page);
                "frame".to_string()
            }
        };
        self.record(label);
        Ok(())
    }

    fn advance(&mut self, by: Duration) {
        self.now += by;
        let now = self.now;
        let (due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|(at, _)| *at <= now);
        self.timers = pending;
        for (_, generation) in due {
            self.state.on_suppression_timeout(generation);
        }
    }

    fn record(&mut self, event: String) {
        let step = ReplayStep {
            at_ms: self.now.as_millis() as u64,
            event,
            scroll_top: self.page.scroll_top(),
            threshold: self.state.threshold(),
            suppressed: self.state.is_suppressed(),
            current: self.current_id().map(str::to_string),
        };
        self.steps.push(step);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trace() -> ScrollTrace {
        ScrollTrace::from_json(
            r#"{
                "window_height": 800,
                "document_height": 3000,
                "headings": [
                    { "id": "intro", "offset": 0 },
                    { "id": "usage", "level": 3, "offset": 900 },
                    { "id": "faq", "offset": 2000, "height": 40 }
                ],
                "events": [
                    { "type": "scroll", "top": 850 },
                    { "type": "wait", "ms": 20 },
                    { "type": "frame" }
                ]
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_trace_parsing_defaults() {
        let trace = trace();
        assert_eq!(trace.headings[0].level, 2);
        assert_eq!(trace.headings[0].height, 30.0);
        assert_eq!(trace.headings[2].height, 40.0);
        assert_eq!(trace.events[2], TraceEvent::Frame);
        assert_eq!(trace.headings().unwrap()[1].label_html, "usage");
    }

    #[test]
    fn test_simulated_page_positions() {
        let trace = trace();
        let mut page =
            SimulatedPage::new(&trace.headings().unwrap(), &trace.headings, 800.0, 3000.0).unwrap();
        page.scroll_to(500.0);
        assert_eq!(page.heading_rect(1), Some(HeadingRect::new(400.0, 430.0)));

        page.scroll_to(10_000.0);
        assert_eq!(page.scroll_top(), 2200.0);

        assert!(page.scroll_to_heading("usage"));
        assert_eq!(page.scroll_top(), 900.0);
        assert!(!page.scroll_to_heading("missing"));
    }

    #[test]
    fn test_missing_layout_is_reported() {
        let trace = trace();
        let headings = vec![Heading::new(2, "elsewhere", "Elsewhere")];
        let result = SimulatedPage::new(&headings, &trace.headings, 800.0, 3000.0);
        assert_eq!(
            result.err(),
            Some(ReplayError::MissingLayout("elsewhere".to_string()))
        );
    }

    #[test]
    fn test_replay_records_each_event() {
        let trace = trace();
        let headings = trace.headings().unwrap();
        let mut replay = Replay::new(NavConfig::default(), headings, &trace).unwrap();
        assert_eq!(replay.current_id(), Some("intro"));

        replay.run(&trace.events).unwrap();
        assert_eq!(replay.steps().len(), 4);
        assert_eq!(replay.current_id(), Some("usage"));
        assert_eq!(replay.steps()[2].at_ms, 20);
    }

    #[test]
    fn test_unknown_click_leaves_state_untouched() {
        let trace = trace();
        let headings = trace.headings().unwrap();
        let mut replay = Replay::new(NavConfig::default(), headings, &trace).unwrap();

        let result = replay.apply(&TraceEvent::Click {
            id: "nowhere".to_string(),
        });
        assert_eq!(result, Err(ReplayError::UnknownHeading("nowhere".to_string())));
        assert!(!replay.state().is_suppressed());
        assert!(replay.timers.is_empty());
        assert_eq!(replay.steps().len(), 1);
        assert_eq!(replay.page().scroll_top(), 0.0);
    }

    #[test]
    fn test_trace_levels_outside_heading_range_are_rejected() {
        for level in [0, 1, 7] {
            let trace = ScrollTrace::from_json(&format!(
                r#"{{ "window_height": 800, "document_height": 3000,
                     "headings": [{{ "id": "a", "offset": 0 }}, {{ "id": "title", "level": {level}, "offset": 40 }}] }}"#
            ))
            .unwrap();
            assert_eq!(
                trace.headings(),
                Err(ReplayError::InvalidLevel {
                    id: "title".to_string(),
                    level
                })
            );
        }
    }

    #[test]
    fn test_replay_without_headings_fails() {
        let trace = trace();
        let result = Replay::new(NavConfig::default(), Vec::new(), &trace);
        assert!(matches!(result, Err(ReplayError::NoHeadings)));
    }
}
