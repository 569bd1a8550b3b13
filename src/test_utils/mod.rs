pub mod fake_pages;

pub mod test_helpers {
    use crate::config::NavConfig;
    use crate::simulation::{Replay, ReplayError, ScrollTrace, TraceEvent, TraceHeading};
    use crate::types::Heading;

    /// Builder for replaying a scroll scenario against a simulated page
    pub struct ScenarioBuilder {
        config: NavConfig,
        trace: ScrollTrace,
    }

    impl Default for ScenarioBuilder {
        fn default() -> Self {
            Self::new(800.0, 3000.0)
        }
    }

    impl ScenarioBuilder {
        pub fn new(window_height: f64, document_height: f64) -> Self {
            Self {
                config: NavConfig::default(),
                trace: ScrollTrace {
                    window_height,
                    document_height,
                    headings: Vec::new(),
                    events: Vec::new(),
                },
            }
        }

        pub fn config(mut self, config: NavConfig) -> Self {
            self.config = config;
            self
        }

        /// Add a heading `offset` px below the document top
        pub fn heading(mut self, level: u8, id: &str, offset: f64) -> Self {
            self.trace.headings.push(TraceHeading {
                id: id.to_string(),
                level,
                label: None,
                offset,
                height: 30.0,
            });
            self
        }

        pub fn scroll(mut self, top: f64) -> Self {
            self.trace.events.push(TraceEvent::Scroll { top });
            self
        }

        /// Scroll in `steps` equal increments from `from` to `to`
        pub fn scroll_through(mut self, from: f64, to: f64, steps: usize) -> Self {
            let steps = steps.max(1);
            for i in 1..=steps {
                let top = from + (to - from) * i as f64 / steps as f64;
                self.trace.events.push(TraceEvent::Scroll { top });
            }
            self
        }

        pub fn resize(mut self, window_height: f64) -> Self {
            self.trace.events.push(TraceEvent::Resize { window_height });
            self
        }

        /// Click the sidebar entry of heading `id`
        pub fn click(mut self, id: &str) -> Self {
            self.trace.events.push(TraceEvent::Click { id: id.to_string() });
            self
        }

        pub fn wait(mut self, ms: u64) -> Self {
            self.trace.events.push(TraceEvent::Wait { ms });
            self
        }

        pub fn frames(mut self, count: usize) -> Self {
            for _ in 0..count {
                self.trace.events.push(TraceEvent::Frame);
            }
            self
        }

        pub fn headings(&self) -> Result<Vec<Heading>, ReplayError> {
            self.trace.headings()
        }

        pub fn trace(&self) -> &ScrollTrace {
            &self.trace
        }

        /// Loads the page without replaying any event
        pub fn load(self) -> Result<Replay, ReplayError> {
            Replay::new(self.config, self.trace.headings()?, &self.trace)
        }

        /// Loads the page and replays every queued event
        pub fn run(self) -> Result<Replay, ReplayError> {
            let mut replay = Replay::new(self.config, self.trace.headings()?, &self.trace)?;
            replay.run(&self.trace.events)?;
            Ok(replay)
        }
    }
}
