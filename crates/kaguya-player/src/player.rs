//! The player surface: taps, controls, indicators and shortcuts together.

use std::time::{Duration, Instant};

use kaguya_core::config::PlayerConfig;
use tracing::debug;

use crate::controls::{ControlsVisibility, Interaction};
use crate::engine::PlaybackEvent;
use crate::gesture::{Point, SeekDirection, Tap, TapRecognizer, TapTarget};
use crate::indicator::SeekIndicators;
use crate::shortcut::{map_shortcut, Key, Modifiers, Shortcut};

/// Tunables for a [`Player`], resolved for one device class.
#[derive(Debug, Clone)]
pub struct PlayerSettings {
    pub touch_primary: bool,
    pub hide_delay: Duration,
    pub tap_threshold: Duration,
    pub drag_slop: f32,
    pub seek_step: f64,
    pub seek_zone_percent: f32,
    pub indicator_duration: Duration,
}

impl PlayerSettings {
    pub fn from_config(config: &PlayerConfig, touch_primary: bool) -> Self {
        Self {
            touch_primary,
            hide_delay: config.hide_delay(),
            tap_threshold: config.tap_threshold(touch_primary),
            drag_slop: config.drag_slop_px,
            seek_step: config.seek_step_secs,
            seek_zone_percent: config.seek_zone_percent,
            indicator_duration: config.indicator_duration(),
        }
    }
}

/// Raw input from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerInput {
    PointerDown { point: Point },
    PointerUp { point: Point, target: TapTarget },
    PointerMove,
    TouchMove { on_progress_control: bool },
    Key { key: Key, modifiers: Modifiers },
}

/// Actions the host must carry out on the engine or page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerCommand {
    SeekBy(f64),
    TogglePlay,
    NextEpisode,
    PreviousEpisode,
}

/// What the rendering layer needs at a given instant.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerView {
    pub controls_shown: bool,
    pub buffering: bool,
    pub indicators: Vec<SeekDirection>,
}

#[derive(Debug, Clone)]
pub struct Player {
    settings: PlayerSettings,
    viewport_width: f32,
    taps: TapRecognizer,
    controls: ControlsVisibility,
    indicators: SeekIndicators,
}

impl Player {
    pub fn new(settings: PlayerSettings, viewport_width: f32) -> Self {
        Self {
            viewport_width,
            taps: TapRecognizer::new(settings.tap_threshold, settings.drag_slop),
            controls: ControlsVisibility::new(settings.hide_delay, settings.touch_primary),
            indicators: SeekIndicators::new(settings.indicator_duration),
            settings,
        }
    }

    pub fn set_viewport_width(&mut self, width: f32) {
        self.viewport_width = width;
    }

    pub fn settings(&self) -> &PlayerSettings {
        &self.settings
    }

    pub fn handle(&mut self, now: Instant, input: PlayerInput) -> Vec<PlayerCommand> {
        match input {
            PlayerInput::PointerDown { point } => {
                self.taps.pointer_down(point);
                Vec::new()
            }
            PlayerInput::PointerUp { point, target } => {
                let tap = self.taps.pointer_up(now, point, target);
                tap.map(|t| self.resolve_tap(now, t)).unwrap_or_default()
            }
            PlayerInput::PointerMove => {
                self.controls.interact(now, Interaction::PointerMove);
                Vec::new()
            }
            PlayerInput::TouchMove {
                on_progress_control,
            } => {
                self.controls.interact(
                    now,
                    Interaction::TouchMove {
                        on_progress_control,
                    },
                );
                Vec::new()
            }
            PlayerInput::Key { key, modifiers } => {
                self.controls.interact(now, Interaction::KeyPress);
                map_shortcut(key, modifiers)
                    .map(|s| vec![self.shortcut_command(s)])
                    .unwrap_or_default()
            }
        }
    }

    pub fn on_playback(&mut self, now: Instant, event: PlaybackEvent) {
        self.controls.on_playback(now, event);
    }

    /// Advance timers to `now`.
    pub fn tick(&mut self, now: Instant) -> Vec<PlayerCommand> {
        let commands = self
            .taps
            .poll(now)
            .map(|t| self.resolve_tap(now, t))
            .unwrap_or_default();
        self.controls.tick(now);
        self.indicators.tick(now);
        commands
    }

    pub fn deadline(&self) -> Option<Instant> {
        crate::earliest(
            crate::earliest(self.taps.deadline(), self.controls.deadline()),
            self.indicators.deadline(),
        )
    }

    pub fn view(&self, now: Instant) -> PlayerView {
        PlayerView {
            controls_shown: self.controls.is_shown(),
            buffering: self.controls.is_buffering(),
            indicators: self.indicators.active(now),
        }
    }

    fn resolve_tap(&mut self, now: Instant, tap: Tap) -> Vec<PlayerCommand> {
        match tap {
            Tap::Single(info) => {
                self.controls.interact(now, Interaction::Tap(info.target));
                Vec::new()
            }
            Tap::Double(info) => {
                let direction = SeekDirection::from_point(
                    info.point.x,
                    self.viewport_width,
                    self.settings.seek_zone_percent,
                );
                debug!(?direction, x = info.point.x, "double tap seek");
                self.indicators.show(direction, now);
                vec![PlayerCommand::SeekBy(direction.offset(self.settings.seek_step))]
            }
            Tap::Drag => Vec::new(),
        }
    }

    fn shortcut_command(&self, shortcut: Shortcut) -> PlayerCommand {
        match shortcut {
            Shortcut::TogglePlay => PlayerCommand::TogglePlay,
            Shortcut::SeekBackward => PlayerCommand::SeekBy(-self.settings.seek_step),
            Shortcut::SeekForward => PlayerCommand::SeekBy(self.settings.seek_step),
            Shortcut::NextEpisode => PlayerCommand::NextEpisode,
            Shortcut::PreviousEpisode => PlayerCommand::PreviousEpisode,
        }
    }
}
