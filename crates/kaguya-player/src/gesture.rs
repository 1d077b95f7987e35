//! Tap recognition for the video surface.

use std::time::{Duration, Instant};

/// Pointer position in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn distance(self, other: Point) -> f32 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// What a pointer event landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapTarget {
    /// The dimmed background overlay behind the controls.
    Overlay,
    /// The seek bar.
    ProgressControl,
    /// Any other control or the bare video.
    Surface,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TapInfo {
    pub point: Point,
    pub target: TapTarget,
}

/// A resolved interaction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tap {
    Single(TapInfo),
    Double(TapInfo),
    Drag,
}

/// Side of the viewport a double tap seeks towards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekDirection {
    Backward,
    Forward,
}

impl SeekDirection {
    /// Taps left of `zone_percent` of the width seek backward, the rest forward.
    pub fn from_point(x: f32, viewport_width: f32, zone_percent: f32) -> Self {
        if x < viewport_width * zone_percent / 100.0 {
            Self::Backward
        } else {
            Self::Forward
        }
    }

    /// Signed seek offset for a step of `step_secs`.
    pub fn offset(self, step_secs: f64) -> f64 {
        match self {
            Self::Backward => -step_secs,
            Self::Forward => step_secs,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Press {
    at: Point,
}

#[derive(Debug, Clone, Copy)]
struct HeldTap {
    info: TapInfo,
    release_at: Instant,
}

/// Classifies pointer down/up pairs as single taps, double taps or drags.
///
/// With a zero threshold every tap resolves immediately as `Single`.
/// Otherwise a first tap is held until the threshold elapses (see
/// [`TapRecognizer::poll`]) or a second tap turns it into a `Double`.
#[derive(Debug, Clone)]
pub struct TapRecognizer {
    threshold: Duration,
    drag_slop: f32,
    press: Option<Press>,
    held: Option<HeldTap>,
}

impl TapRecognizer {
    pub fn new(threshold: Duration, drag_slop: f32) -> Self {
        Self {
            threshold,
            drag_slop,
            press: None,
            held: None,
        }
    }

    pub fn threshold(&self) -> Duration {
        self.threshold
    }

    pub fn pointer_down(&mut self, point: Point) {
        self.press = Some(Press { at: point });
    }

    /// Finish a press. Returns the interaction when it resolves right away.
    pub fn pointer_up(&mut self, now: Instant, point: Point, target: TapTarget) -> Option<Tap> {
        let press = self.press.take();
        if let Some(press) = press {
            if press.at.distance(point) > self.drag_slop {
                return Some(Tap::Drag);
            }
        }
        self.tap(now, TapInfo { point, target })
    }

    /// Feed an already-recognized tap.
    pub fn tap(&mut self, now: Instant, info: TapInfo) -> Option<Tap> {
        if self.threshold.is_zero() {
            return Some(Tap::Single(info));
        }

        match self.held.take() {
            Some(held) if now < held.release_at => Some(Tap::Double(info)),
            Some(held) => {
                // The earlier tap expired without being polled.
                self.held = Some(HeldTap {
                    info,
                    release_at: now + self.threshold,
                });
                Some(Tap::Single(held.info))
            }
            None => {
                self.held = Some(HeldTap {
                    info,
                    release_at: now + self.threshold,
                });
                None
            }
        }
    }

    /// Release a held tap whose double-tap window has closed.
    pub fn poll(&mut self, now: Instant) -> Option<Tap> {
        match self.held {
            Some(held) if now >= held.release_at => {
                self.held = None;
                Some(Tap::Single(held.info))
            }
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.held.map(|h| h.release_at)
    }
}
