use std::time::Duration;

/// Number of animation frames to wait after the window before reading layout.
pub const SETTLE_FRAMES: u8 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingClick {
    heading_index: usize,
    frames_seen: u8,
}

/// Ignores scroll-driven updates for a short window after a sidebar click.
///
/// Clicking a header link makes the browser scroll, and detecting the end of
/// that scroll is unreliable, so updates are simply switched off for a fixed
/// window. Each arm hands out a generation; only the timer of the latest arm
/// may release the window, so a second click re-arms instead of stacking.
pub struct ScrollSuppression {
    window: Duration,
    suppressed: bool,
    generation: u64,
    pending: Option<PendingClick>,
}

impl ScrollSuppression {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            suppressed: false,
            generation: 0,
            pending: None,
        }
    }

    /// How long the caller should wait before calling [`Self::release`]
    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppressed
    }

    /// Heading waiting to be made current once layout has settled
    pub fn pending(&self) -> Option<usize> {
        self.pending.map(|pending| pending.heading_index)
    }

    /// Starts a window. `target` is the clicked heading, if it is one we track.
    pub fn arm(&mut self, target: Option<usize>) -> u64 {
        self.generation += 1;
        self.suppressed = true;
        self.pending = target.map(|heading_index| PendingClick {
            heading_index,
            frames_seen: 0,
        });
        log::debug!(
            "Scroll updates suppressed for {}ms (generation {})",
            self.window.as_millis(),
            self.generation
        );
        self.generation
    }

    /// Timer callback; stale generations are ignored.
    pub fn release(&mut self, generation: u64) -> bool {
        if generation != self.generation || !self.suppressed {
            return false;
        }
        self.suppressed = false;
        log::debug!("Scroll suppression released (generation {generation})");
        true
    }

    /// Animation-frame callback. Yields the clicked heading on the second
    /// frame after the window has ended.
    pub fn on_animation_frame(&mut self) -> Option<usize> {
        if self.suppressed {
            return None;
        }
        let pending = self.pending.as_mut()?;
        pending.frames_seen += 1;
        if pending.frames_seen < SETTLE_FRAMES {
            return None;
        }
        self.pending.take().map(|pending| pending.heading_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suppression() -> ScrollSuppression {
        ScrollSuppression::new(Duration::from_millis(100))
    }

    #[test]
    fn test_arm_and_release() {
        let mut suppression = suppression();
        assert!(!suppression.is_suppressed());

        let generation = suppression.arm(Some(3));
        assert!(suppression.is_suppressed());
        assert_eq!(suppression.pending(), Some(3));

        assert!(suppression.release(generation));
        assert!(!suppression.is_suppressed());
        assert!(!suppression.release(generation));
    }

    #[test]
    fn test_second_click_rearms() {
        let mut suppression = suppression();
        let first = suppression.arm(Some(1));
        let second = suppression.arm(Some(2));

        // The first click's timer must not end the second click's window
        assert!(!suppression.release(first));
        assert!(suppression.is_suppressed());
        assert_eq!(suppression.pending(), Some(2));

        assert!(suppression.release(second));
        assert!(!suppression.is_suppressed());
    }

    #[test]
    fn test_frames_during_window_do_not_count() {
        let mut suppression = suppression();
        let generation = suppression.arm(Some(4));

        assert_eq!(suppression.on_animation_frame(), None);
        assert_eq!(suppression.on_animation_frame(), None);
        assert_eq!(suppression.on_animation_frame(), None);

        suppression.release(generation);
        assert_eq!(suppression.on_animation_frame(), None);
        assert_eq!(suppression.on_animation_frame(), Some(4));
        assert_eq!(suppression.pending(), None);
        assert_eq!(suppression.on_animation_frame(), None);
    }

    #[test]
    fn test_click_on_untracked_target_only_suppresses() {
        let mut suppression = suppression();
        let generation = suppression.arm(None);
        assert!(suppression.is_suppressed());
        suppression.release(generation);
        assert_eq!(suppression.on_animation_frame(), None);
        assert_eq!(suppression.on_animation_frame(), None);
    }

    #[test]
    fn test_frames_without_click_do_nothing() {
        let mut suppression = suppression();
        assert_eq!(suppression.on_animation_frame(), None);
        assert_eq!(suppression.window(), Duration::from_millis(100));
    }
}
