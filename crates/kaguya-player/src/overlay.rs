//! "You are watching…" overlay shown after the tab has been hidden a while.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct TabAwayOverlay {
    delay: Duration,
    enabled: bool,
    show_at: Option<Instant>,
    shown: bool,
}

impl TabAwayOverlay {
    /// Touch-primary devices never show the overlay.
    pub fn new(delay: Duration, touch_primary: bool) -> Self {
        Self {
            delay,
            enabled: !touch_primary,
            show_at: None,
            shown: false,
        }
    }

    pub fn on_visibility(&mut self, now: Instant, hidden: bool) {
        if !self.enabled {
            return;
        }
        self.show_at = hidden.then(|| now + self.delay);
    }

    pub fn on_pointer_move(&mut self) {
        self.shown = false;
    }

    pub fn tick(&mut self, now: Instant) {
        if self.show_at.is_some_and(|t| now >= t) {
            self.show_at = None;
            self.shown = true;
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.show_at
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }
}
