//! Auto-hiding transport controls.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::PlaybackEvent;
use crate::gesture::TapTarget;

/// Interactions that can keep the controls on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interaction {
    /// Mouse movement anywhere over the player.
    PointerMove,
    /// Finger movement; only scrubbing the progress control counts.
    TouchMove { on_progress_control: bool },
    /// A resolved single tap.
    Tap(TapTarget),
    KeyPress,
}

/// Visibility of the controls and overlay.
///
/// Starts hidden. Qualifying interactions show the controls and restart a
/// hide countdown. Buffering holds them on screen until playback resumes,
/// at which point the countdown starts over.
#[derive(Debug, Clone)]
pub struct ControlsVisibility {
    hide_delay: Duration,
    touch_primary: bool,
    visible: bool,
    buffering: bool,
    hide_at: Option<Instant>,
}

impl ControlsVisibility {
    pub fn new(hide_delay: Duration, touch_primary: bool) -> Self {
        Self {
            hide_delay,
            touch_primary,
            visible: false,
            buffering: false,
            hide_at: None,
        }
    }

    pub fn interact(&mut self, now: Instant, interaction: Interaction) {
        match interaction {
            Interaction::PointerMove if self.touch_primary => {}
            Interaction::TouchMove {
                on_progress_control: false,
            } => {}
            Interaction::Tap(TapTarget::Overlay) if self.touch_primary => self.hide(),
            _ => self.show(now),
        }
    }

    pub fn on_playback(&mut self, now: Instant, event: PlaybackEvent) {
        match event {
            PlaybackEvent::Waiting => {
                debug!("buffering, holding controls");
                self.buffering = true;
            }
            PlaybackEvent::Playing | PlaybackEvent::Play if self.buffering => {
                self.buffering = false;
                self.show(now);
            }
            _ => {}
        }
    }

    /// Apply an expired hide countdown.
    pub fn tick(&mut self, now: Instant) {
        if self.hide_at.is_some_and(|t| now >= t) {
            self.hide_at = None;
            self.visible = false;
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.hide_at
    }

    pub fn is_shown(&self) -> bool {
        self.visible || self.buffering
    }

    pub fn is_buffering(&self) -> bool {
        self.buffering
    }

    fn show(&mut self, now: Instant) {
        self.visible = true;
        self.hide_at = Some(now + self.hide_delay);
    }

    fn hide(&mut self) {
        self.visible = false;
        self.hide_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(3000);

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_initially_hidden() {
        let controls = ControlsVisibility::new(DELAY, false);
        assert!(!controls.is_shown());
        assert!(controls.deadline().is_none());
    }

    #[test]
    fn test_interaction_shows_then_hides() {
        let mut controls = ControlsVisibility::new(DELAY, false);
        let t0 = Instant::now();
        controls.interact(t0, Interaction::PointerMove);
        assert!(controls.is_shown());

        controls.tick(t0 + ms(2999));
        assert!(controls.is_shown());
        controls.tick(t0 + DELAY);
        assert!(!controls.is_shown());
    }

    #[test]
    fn test_debounce_restarts_countdown() {
        let mut controls = ControlsVisibility::new(DELAY, false);
        let t0 = Instant::now();
        controls.interact(t0, Interaction::KeyPress);
        controls.interact(t0 + ms(2500), Interaction::PointerMove);

        // The first countdown would have fired here.
        controls.tick(t0 + ms(3000));
        assert!(controls.is_shown());
        assert_eq!(controls.deadline(), Some(t0 + ms(5500)));

        controls.tick(t0 + ms(5500));
        assert!(!controls.is_shown());
    }

    #[test]
    fn test_overlay_tap_hides_on_touch() {
        let mut controls = ControlsVisibility::new(DELAY, true);
        let t0 = Instant::now();
        controls.interact(t0, Interaction::Tap(TapTarget::Surface));
        assert!(controls.is_shown());

        controls.interact(t0 + ms(100), Interaction::Tap(TapTarget::Overlay));
        assert!(!controls.is_shown());
        assert!(controls.deadline().is_none());
    }

    #[test]
    fn test_overlay_tap_shows_on_pointer_device() {
        let mut controls = ControlsVisibility::new(DELAY, false);
        controls.interact(Instant::now(), Interaction::Tap(TapTarget::Overlay));
        assert!(controls.is_shown());
    }

    #[test]
    fn test_touch_device_ignores_mouse_moves() {
        let mut controls = ControlsVisibility::new(DELAY, true);
        let t0 = Instant::now();
        controls.interact(t0, Interaction::PointerMove);
        assert!(!controls.is_shown());

        controls.interact(
            t0,
            Interaction::TouchMove {
                on_progress_control: false,
            },
        );
        assert!(!controls.is_shown());

        controls.interact(
            t0,
            Interaction::TouchMove {
                on_progress_control: true,
            },
        );
        assert!(controls.is_shown());
    }

    #[test]
    fn test_buffering_holds_controls() {
        let mut controls = ControlsVisibility::new(DELAY, false);
        let t0 = Instant::now();
        controls.interact(t0, Interaction::PointerMove);
        controls.on_playback(t0 + ms(2900), PlaybackEvent::Waiting);

        controls.tick(t0 + ms(3000));
        assert!(controls.is_shown());
        controls.tick(t0 + ms(60_000));
        assert!(controls.is_shown());
        assert!(controls.is_buffering());
    }

    #[test]
    fn test_buffering_end_restarts_countdown() {
        let mut controls = ControlsVisibility::new(DELAY, false);
        let t0 = Instant::now();
        controls.on_playback(t0, PlaybackEvent::Waiting);
        controls.on_playback(t0 + ms(10_000), PlaybackEvent::Playing);

        assert!(controls.is_shown());
        assert_eq!(controls.deadline(), Some(t0 + ms(13_000)));
        controls.tick(t0 + ms(12_999));
        assert!(controls.is_shown());
        controls.tick(t0 + ms(13_000));
        assert!(!controls.is_shown());
    }

    #[test]
    fn test_play_without_buffering_does_not_show() {
        let mut controls = ControlsVisibility::new(DELAY, false);
        controls.on_playback(Instant::now(), PlaybackEvent::Play);
        assert!(!controls.is_shown());
    }
}
