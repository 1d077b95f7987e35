//! Player state for the watch page.
//!
//! Every state machine here is driven by explicit `Instant`s supplied by the
//! caller and exposes its next deadline, so the host decides how time passes.

pub mod controls;
pub mod engine;
pub mod gesture;
pub mod indicator;
pub mod overlay;
pub mod player;
pub mod resume;
pub mod shortcut;
pub mod subscription;
pub mod tracker;

/// Earliest of two optional deadlines.
pub fn earliest(
    a: Option<std::time::Instant>,
    b: Option<std::time::Instant>,
) -> Option<std::time::Instant> {
    match (a, b) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}
