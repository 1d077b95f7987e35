//! The playback element the player state is layered on.

use kaguya_core::models::SourceList;

use crate::subscription::EventHub;

/// Lifecycle events emitted by the playback engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaybackEvent {
    /// Stalled waiting for data.
    Waiting,
    /// Playback actually (re)started after buffering.
    Playing,
    /// Play was requested.
    Play,
    Pause,
    Ended,
    /// First playable frame is available.
    CanPlay,
    /// Current position changed.
    TimeUpdate,
}

/// A media element: HLS wrapper, native player, or a test double.
pub trait PlaybackEngine {
    /// Replace the current media with `sources`.
    fn load(&mut self, sources: &SourceList);

    /// Position in seconds.
    fn current_time(&self) -> f64;

    fn set_current_time(&mut self, secs: f64);

    /// Media length in seconds, once known.
    fn duration(&self) -> Option<f64>;

    fn is_paused(&self) -> bool;

    fn play(&mut self);

    fn pause(&mut self);

    /// Registry hosts emit lifecycle events through.
    fn events(&self) -> &EventHub<PlaybackEvent>;
}

/// Move the position by `delta` seconds, clamped to `[0, duration]`.
pub fn seek_by<E: PlaybackEngine + ?Sized>(engine: &mut E, delta: f64) -> f64 {
    let mut target = (engine.current_time() + delta).max(0.0);
    if let Some(duration) = engine.duration() {
        target = target.min(duration);
    }
    engine.set_current_time(target);
    target
}

pub fn toggle_play<E: PlaybackEngine + ?Sized>(engine: &mut E) {
    if engine.is_paused() {
        engine.play();
    } else {
        engine.pause();
    }
}
