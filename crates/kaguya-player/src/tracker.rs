//! Playback position tracking.
//!
//! Two cadences write the position: a periodic remote save while playing
//! and a local snapshot on every time update. Both are last-write-wins.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::engine::PlaybackEvent;

/// A position write requested by the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionSave {
    /// Periodic write to the backend.
    Remote {
        anime_id: i64,
        episode_id: i64,
        position: f64,
    },
    /// Snapshot in the local store.
    Local {
        anime_id: i64,
        episode_id: i64,
        position: f64,
    },
}

#[derive(Debug, Clone)]
pub struct PositionTracker {
    anime_id: i64,
    episode_id: i64,
    interval: Duration,
    next_save: Option<Instant>,
}

impl PositionTracker {
    pub fn new(anime_id: i64, episode_id: i64, interval: Duration) -> Self {
        Self {
            anime_id,
            episode_id,
            interval,
            next_save: None,
        }
    }

    pub fn episode_id(&self) -> i64 {
        self.episode_id
    }

    /// Switch to another episode of the same title. The interval stops until
    /// the next `Play`.
    pub fn retarget(&mut self, episode_id: i64) {
        self.episode_id = episode_id;
        self.next_save = None;
    }

    pub fn on_playback(
        &mut self,
        now: Instant,
        event: PlaybackEvent,
        position: f64,
    ) -> Option<PositionSave> {
        match event {
            PlaybackEvent::Play => {
                self.next_save = Some(now + self.interval);
                None
            }
            PlaybackEvent::Pause | PlaybackEvent::Ended => {
                if self.next_save.take().is_some() {
                    debug!(episode_id = self.episode_id, "position interval stopped");
                }
                None
            }
            PlaybackEvent::TimeUpdate => Some(PositionSave::Local {
                anime_id: self.anime_id,
                episode_id: self.episode_id,
                position,
            }),
            _ => None,
        }
    }

    /// Emit the periodic remote save once its interval has elapsed.
    pub fn poll(&mut self, now: Instant, position: f64) -> Option<PositionSave> {
        let due = self.next_save.filter(|t| now >= *t)?;
        let mut next = due + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next_save = Some(next);
        Some(PositionSave::Remote {
            anime_id: self.anime_id,
            episode_id: self.episode_id,
            position,
        })
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.next_save
    }

    pub fn is_running(&self) -> bool {
        self.next_save.is_some()
    }
}
