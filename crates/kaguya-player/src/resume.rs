//! Resume-or-restart decision for a watch page instance.

use std::fmt::Display;

use kaguya_core::episodes::EpisodeList;
use kaguya_core::models::{Episode, RemoteWatched};
use tracing::{debug, info};

/// Tracks the saved position of a title against the episode being watched.
///
/// When the saved episode is the current one the saved position is applied
/// silently on the first playable frame. When it differs, a prompt offers
/// the saved episode. Declining or accepting is sticky for the page
/// instance.
#[derive(Debug, Clone, Default)]
pub struct ResumeState {
    saved: Option<RemoteWatched>,
    saved_episode: Option<Episode>,
    declined: bool,
    prompt_open: bool,
    pending_seek: Option<f64>,
    seek_armed_for: Option<i64>,
}

impl ResumeState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the result of the saved-position lookup. Safe to call again
    /// whenever the data is re-fetched.
    pub fn on_saved<E: Display>(
        &mut self,
        saved: Result<Option<RemoteWatched>, E>,
        episodes: &EpisodeList,
        current_episode_id: i64,
    ) {
        let record = match saved {
            Ok(Some(record)) => record,
            Ok(None) => {
                self.clear_saved();
                return;
            }
            Err(e) => {
                debug!(error = %e, "saved position unavailable, not offering resume");
                self.clear_saved();
                return;
            }
        };

        let Some(episode) = episodes.find(record.episode_id).cloned() else {
            debug!(episode_id = record.episode_id, "saved episode no longer listed");
            self.clear_saved();
            return;
        };

        self.saved = Some(record);
        self.saved_episode = Some(episode);
        self.evaluate(current_episode_id);
    }

    /// Re-evaluate after the page moved to another episode.
    pub fn on_episode_changed(&mut self, current_episode_id: i64) {
        self.evaluate(current_episode_id);
    }

    /// Episode named by the resume prompt, while it is open.
    pub fn prompt(&self) -> Option<&Episode> {
        if self.prompt_open && !self.declined {
            self.saved_episode.as_ref()
        } else {
            None
        }
    }

    pub fn decline(&mut self) {
        if self.prompt_open {
            info!("resume declined");
        }
        self.prompt_open = false;
        self.declined = true;
    }

    /// Close the prompt and return the episode to navigate to.
    pub fn accept(&mut self) -> Option<i64> {
        let target = self.prompt().map(|e| e.episode_id)?;
        self.prompt_open = false;
        self.declined = true;
        Some(target)
    }

    /// Position to seek to on the first playable frame. Yields at most once
    /// per armed episode.
    pub fn on_can_play(&mut self) -> Option<f64> {
        self.pending_seek.take()
    }

    /// Position armed for the next playable frame, without consuming it.
    pub fn pending_seek(&self) -> Option<f64> {
        self.pending_seek
    }

    pub fn is_declined(&self) -> bool {
        self.declined
    }

    fn evaluate(&mut self, current_episode_id: i64) {
        let Some(saved) = &self.saved else {
            return;
        };

        if saved.episode_id == current_episode_id {
            self.prompt_open = false;
            self.declined = true;
            if self.seek_armed_for != Some(current_episode_id) {
                self.seek_armed_for = Some(current_episode_id);
                self.pending_seek = saved.watched_time.filter(|t| *t > 0.0);
            }
        } else {
            self.pending_seek = None;
            if !self.declined {
                self.prompt_open = true;
            }
        }
    }

    fn clear_saved(&mut self) {
        self.saved = None;
        self.saved_episode = None;
        self.prompt_open = false;
        self.pending_seek = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn episodes() -> EpisodeList {
        EpisodeList::sorted(
            (1..=3)
                .map(|n| Episode {
                    episode_id: n * 10,
                    name: format!("Tập {n}"),
                    thumbnail_image: None,
                    anime_id: 1,
                })
                .collect(),
        )
    }

    fn saved(episode_id: i64, time: f64) -> Result<Option<RemoteWatched>, String> {
        Ok(Some(RemoteWatched {
            anime_id: 1,
            episode_id,
            watched_time: Some(time),
        }))
    }

    #[test]
    fn test_different_episode_prompts_once() {
        let list = episodes();
        let mut state = ResumeState::new();
        state.on_saved(saved(20, 300.0), &list, 10);

        assert_eq!(state.prompt().map(|e| e.name.as_str()), Some("Tập 2"));
        assert_eq!(state.on_can_play(), None);

        state.decline();
        assert!(state.prompt().is_none());

        // Re-fetched data must not reopen the prompt.
        state.on_saved(saved(20, 310.0), &list, 10);
        assert!(state.prompt().is_none());
        assert!(state.is_declined());
    }

    #[test]
    fn test_accept_navigates_and_is_sticky() {
        let list = episodes();
        let mut state = ResumeState::new();
        state.on_saved(saved(20, 300.0), &list, 10);

        assert_eq!(state.accept(), Some(20));
        assert!(state.prompt().is_none());
        assert_eq!(state.accept(), None);

        // Arriving on the saved episode seeks to the saved position.
        state.on_episode_changed(20);
        assert_eq!(state.on_can_play(), Some(300.0));
        assert_eq!(state.on_can_play(), None);
    }

    #[test]
    fn test_same_episode_seeks_once_without_prompt() {
        let list = episodes();
        let mut state = ResumeState::new();
        state.on_saved(saved(30, 512.0), &list, 30);

        assert!(state.prompt().is_none());
        assert_eq!(state.on_can_play(), Some(512.0));
        assert_eq!(state.on_can_play(), None);

        state.on_saved(saved(30, 512.0), &list, 30);
        assert_eq!(state.on_can_play(), None);
    }

    #[test]
    fn test_zero_position_does_not_seek() {
        let list = episodes();
        let mut state = ResumeState::new();
        state.on_saved(saved(10, 0.0), &list, 10);
        assert_eq!(state.on_can_play(), None);
        assert!(state.prompt().is_none());
    }

    #[test]
    fn test_lookup_failure_suppresses_prompt() {
        let list = episodes();
        let mut state = ResumeState::new();
        state.on_saved::<String>(Err("timeout".into()), &list, 10);
        assert!(state.prompt().is_none());
        assert_eq!(state.on_can_play(), None);

        state.on_saved::<String>(Ok(None), &list, 10);
        assert!(state.prompt().is_none());
    }

    #[test]
    fn test_unknown_saved_episode_ignored() {
        let list = episodes();
        let mut state = ResumeState::new();
        state.on_saved(saved(999, 40.0), &list, 10);
        assert!(state.prompt().is_none());
        assert!(!state.is_declined());
    }

    #[test]
    fn test_leaving_before_first_frame_drops_seek() {
        let list = episodes();
        let mut state = ResumeState::new();
        state.on_saved(saved(10, 42.0), &list, 10);
        state.on_episode_changed(20);
        assert_eq!(state.on_can_play(), None);
        assert!(state.prompt().is_none());
    }
}
