//! One watch page instance: a title, its sorted episodes and the player
//! state for the episode on screen.
//!
//! Every operation takes the current `Instant` and returns the effects the
//! session has to carry out, so the page itself never touches the engine,
//! the network or the store.

use std::fmt::Display;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use kaguya_api::CatalogService;
use kaguya_core::config::AppConfig;
use kaguya_core::episodes::{EpisodeList, MediaKey};
use kaguya_core::models::{Anime, Episode, RemoteWatched, SourceList, WatchedRecord, WatchedUpdate};
use kaguya_player::engine::PlaybackEvent;
use kaguya_player::overlay::TabAwayOverlay;
use kaguya_player::player::{Player, PlayerCommand, PlayerInput, PlayerSettings, PlayerView};
use kaguya_player::resume::ResumeState;
use kaguya_player::tracker::{PositionSave, PositionTracker};

use crate::route::{RouteChange, Router, WatchRoute};
use crate::{Runtime, RuntimeError};

/// Input from the host page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PageInput {
    Player(PlayerInput),
    Visibility { hidden: bool },
    MediaKey(MediaKey),
    AcceptResume,
    DeclineResume,
    SelectEpisode(i64),
    Resize { width: f32 },
    /// Leave the page.
    Close,
}

/// Work the session performs on behalf of the page.
#[derive(Debug, Clone, PartialEq)]
pub enum WatchEffect {
    SaveRemote(WatchedUpdate),
    SaveLocal(WatchedRecord),
    /// Jump to an absolute position.
    Seek(f64),
    SeekBy(f64),
    TogglePlay,
    /// Fetch sources for `episode_id`, then warm the cache for `prefetch`.
    LoadSources {
        episode_id: i64,
        prefetch: Option<i64>,
    },
    Navigated(RouteChange),
}

#[derive(Debug, Clone, PartialEq)]
enum SourceState {
    Loading,
    Ready(SourceList),
    /// Fetch failed or returned nothing; the placeholder stays.
    Unavailable,
}

/// "You are watching" card shown after the tab was hidden a while.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoCard {
    pub title: String,
    pub episode_name: String,
    pub description: Option<String>,
}

const SITE_NAME: &str = "Kaguya";

/// Document title, description and share image for the page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub image: Option<String>,
}

impl PageMeta {
    fn new(anime: &Anime, episode: &Episode) -> Self {
        let title = anime.display_title();
        Self {
            title: format!("{title} - {SITE_NAME}"),
            description: format!(
                "Xem phim {title} tại {SITE_NAME}. Hoàn toàn miễn phí, không quảng cáo"
            ),
            image: anime.share_image(episode).map(str::to_string),
        }
    }
}

/// Snapshot of everything the page renders.
#[derive(Debug, Clone, PartialEq)]
pub struct PageView {
    pub route: WatchRoute,
    pub title: String,
    pub episode: Episode,
    pub episode_index: usize,
    pub episode_count: usize,
    pub has_previous: bool,
    pub has_next: bool,
    pub loading_sources: bool,
    pub player: PlayerView,
    pub resume_prompt: Option<Episode>,
    pub info: Option<InfoCard>,
    pub meta: PageMeta,
}

#[derive(Debug, Clone)]
pub struct WatchPage {
    /// Title metadata without its episode list.
    anime: Anime,
    episodes: EpisodeList,
    index: usize,
    router: Router,
    player: Player,
    tracker: PositionTracker,
    resume: ResumeState,
    overlay: TabAwayOverlay,
    sources: SourceState,
    placeholder: SourceList,
    media_session: bool,
}

impl WatchPage {
    /// Load the title and saved position for `route`.
    ///
    /// A title that cannot be fetched or an episode it does not list is
    /// `NotFound`. A failed saved-position lookup only means no resume.
    pub async fn mount<S: CatalogService + 'static>(
        runtime: &Runtime<S>,
        route: WatchRoute,
        viewport_width: f32,
    ) -> Result<Self, RuntimeError> {
        let anime = runtime.title(route.anime_id).await?;
        let mut page = Self::new(anime, route, runtime.config(), viewport_width)?;
        let saved = runtime.service().get_watched(route.anime_id).await;
        page.apply_saved(saved);
        Ok(page)
    }

    pub fn new(
        mut anime: Anime,
        route: WatchRoute,
        config: &AppConfig,
        viewport_width: f32,
    ) -> Result<Self, RuntimeError> {
        let episodes = EpisodeList::sorted(std::mem::take(&mut anime.episodes));
        let (index, episode_id) = episodes
            .resolve(route.episode_id)
            .map(|cursor| (cursor.index(), cursor.current().episode_id))
            .ok_or_else(|| {
                RuntimeError::NotFound(match route.episode_id {
                    Some(id) => format!("episode {id} of anime {}", anime.ani_id),
                    None => format!("episodes of anime {}", anime.ani_id),
                })
            })?;

        let touch_primary = config.device.touch_primary;
        let settings = PlayerSettings::from_config(&config.player, touch_primary);
        debug!(
            anime_id = anime.ani_id,
            episode_id,
            episodes = episodes.len(),
            touch_primary,
            "watch page mounted"
        );

        Ok(Self {
            router: Router::new(route),
            player: Player::new(settings, viewport_width),
            tracker: PositionTracker::new(
                anime.ani_id,
                episode_id,
                config.tracker.remote_save_interval(),
            ),
            resume: ResumeState::new(),
            overlay: TabAwayOverlay::new(config.watch.info_overlay_delay(), touch_primary),
            sources: SourceState::Loading,
            placeholder: config.watch.placeholder_sources(),
            media_session: false,
            anime,
            episodes,
            index,
        })
    }

    /// Feed the saved-position lookup. Callable again on re-fetch.
    pub fn apply_saved<E: Display>(&mut self, saved: Result<Option<RemoteWatched>, E>) {
        let current = self.current_episode().episode_id;
        self.resume.on_saved(saved, &self.episodes, current);
    }

    /// Effects to run once the session starts.
    pub fn start(&self) -> Vec<WatchEffect> {
        vec![self.load_sources_effect()]
    }

    pub fn anime(&self) -> &Anime {
        &self.anime
    }

    pub fn episodes(&self) -> &EpisodeList {
        &self.episodes
    }

    pub fn current_episode(&self) -> &Episode {
        &self.episodes.as_slice()[self.index]
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn route(&self) -> WatchRoute {
        self.router.current()
    }

    pub fn resume_prompt(&self) -> Option<&Episode> {
        self.resume.prompt()
    }

    /// Position the first playable frame will jump to.
    pub fn pending_resume(&self) -> Option<f64> {
        self.resume.pending_seek()
    }

    pub fn media_session_active(&self) -> bool {
        self.media_session
    }

    /// Sources to play now: the fetched list, or the placeholder.
    pub fn sources(&self) -> &SourceList {
        match &self.sources {
            SourceState::Ready(list) => list,
            SourceState::Loading | SourceState::Unavailable => &self.placeholder,
        }
    }

    pub fn is_loading_sources(&self) -> bool {
        self.sources == SourceState::Loading
    }

    /// Record the fetched sources for `episode_id`. Returns the list the
    /// engine should load, or `None` when the result is stale or empty.
    pub fn on_sources_loaded(
        &mut self,
        episode_id: i64,
        sources: Option<SourceList>,
    ) -> Option<SourceList> {
        if episode_id != self.current_episode().episode_id {
            debug!(episode_id, "dropping sources for a previous episode");
            return None;
        }
        match sources {
            Some(list) => {
                debug!(episode_id, qualities = ?list.qualities(), "sources ready");
                self.sources = SourceState::Ready(list.clone());
                Some(list)
            }
            None => {
                self.sources = SourceState::Unavailable;
                None
            }
        }
    }

    pub fn on_playback(
        &mut self,
        now: Instant,
        event: PlaybackEvent,
        position: f64,
    ) -> Vec<WatchEffect> {
        self.player.on_playback(now, event);

        let mut effects = Vec::new();
        if let Some(save) = self.tracker.on_playback(now, event, position) {
            effects.extend(self.save_effect(save));
        }

        if event == PlaybackEvent::CanPlay {
            if !self.media_session {
                self.media_session = true;
                debug!("media session registered");
            }
            // The placeholder's first frame must not consume the resume seek.
            if matches!(self.sources, SourceState::Ready(_)) {
                if let Some(position) = self.resume.on_can_play() {
                    info!(position, "resuming saved position");
                    effects.push(WatchEffect::Seek(position));
                }
            }
        }
        effects
    }

    pub fn on_input(&mut self, now: Instant, input: PageInput) -> Vec<WatchEffect> {
        match input {
            PageInput::Player(input) => {
                if input == PlayerInput::PointerMove {
                    self.overlay.on_pointer_move();
                }
                let commands = self.player.handle(now, input);
                self.run_commands(commands)
            }
            PageInput::Visibility { hidden } => {
                self.on_visibility(now, hidden);
                Vec::new()
            }
            PageInput::MediaKey(key) => self.media_key(key),
            PageInput::AcceptResume => self.accept_resume(),
            PageInput::DeclineResume => {
                self.decline_resume();
                Vec::new()
            }
            PageInput::SelectEpisode(episode_id) => self.navigate_to(episode_id),
            PageInput::Resize { width } => {
                self.player.set_viewport_width(width);
                Vec::new()
            }
            PageInput::Close => Vec::new(),
        }
    }

    pub fn on_visibility(&mut self, now: Instant, hidden: bool) {
        self.overlay.on_visibility(now, hidden);
    }

    /// Advance every timer to `now`. `position` is the engine's current time.
    pub fn tick(&mut self, now: Instant, position: f64) -> Vec<WatchEffect> {
        let commands = self.player.tick(now);
        let mut effects = self.run_commands(commands);
        self.overlay.tick(now);
        if let Some(save) = self.tracker.poll(now, position) {
            effects.extend(self.save_effect(save));
        }
        effects
    }

    pub fn deadline(&self) -> Option<Instant> {
        kaguya_player::earliest(
            self.player.deadline(),
            kaguya_player::earliest(self.overlay.deadline(), self.tracker.deadline()),
        )
    }

    /// Switch to another episode of this title without leaving the page.
    pub fn navigate_to(&mut self, episode_id: i64) -> Vec<WatchEffect> {
        if episode_id == self.current_episode().episode_id {
            debug!(episode_id, "already on episode");
            return Vec::new();
        }
        let Some(index) = self.episodes.position_of(episode_id) else {
            warn!(episode_id, anime_id = self.anime.ani_id, "episode not in list");
            return Vec::new();
        };

        self.index = index;
        self.tracker.retarget(episode_id);
        self.resume.on_episode_changed(episode_id);
        self.sources = SourceState::Loading;

        let mut effects = Vec::new();
        if let Some(change) = self.router.navigate(self.route().with_episode(episode_id)) {
            info!(route = %change.route, "episode changed");
            effects.push(WatchEffect::Navigated(change));
        }
        effects.push(self.load_sources_effect());
        effects
    }

    /// OS previous/next track. Ignored until the media session exists.
    pub fn media_key(&mut self, key: MediaKey) -> Vec<WatchEffect> {
        if !self.media_session {
            debug!(?key, "media key before media session, ignoring");
            return Vec::new();
        }
        match self.episodes.adjacent(self.index, key) {
            Some(episode) => {
                let episode_id = episode.episode_id;
                self.navigate_to(episode_id)
            }
            None => Vec::new(),
        }
    }

    pub fn accept_resume(&mut self) -> Vec<WatchEffect> {
        match self.resume.accept() {
            Some(episode_id) => self.navigate_to(episode_id),
            None => Vec::new(),
        }
    }

    pub fn decline_resume(&mut self) {
        self.resume.decline();
    }

    pub fn view(&self, now: Instant) -> PageView {
        let episode = self.current_episode().clone();
        let info = self.overlay.is_shown().then(|| InfoCard {
            title: self.anime.display_title().to_string(),
            episode_name: episode.name.clone(),
            description: self.anime.description.clone(),
        });

        PageView {
            route: self.route(),
            title: self.anime.display_title().to_string(),
            episode_index: self.index,
            episode_count: self.episodes.len(),
            has_previous: self.index > 0,
            has_next: self.index + 1 < self.episodes.len(),
            loading_sources: self.is_loading_sources(),
            player: self.player.view(now),
            resume_prompt: self.resume.prompt().cloned(),
            info,
            meta: PageMeta::new(&self.anime, &episode),
            episode,
        }
    }

    fn run_commands(&mut self, commands: Vec<PlayerCommand>) -> Vec<WatchEffect> {
        let mut effects = Vec::new();
        for command in commands {
            match command {
                PlayerCommand::SeekBy(delta) => effects.push(WatchEffect::SeekBy(delta)),
                PlayerCommand::TogglePlay => effects.push(WatchEffect::TogglePlay),
                PlayerCommand::NextEpisode => {
                    effects.extend(self.adjacent_effects(MediaKey::NextTrack));
                }
                PlayerCommand::PreviousEpisode => {
                    effects.extend(self.adjacent_effects(MediaKey::PreviousTrack));
                }
            }
        }
        effects
    }

    fn adjacent_effects(&mut self, key: MediaKey) -> Vec<WatchEffect> {
        match self.episodes.adjacent(self.index, key) {
            Some(episode) => {
                let episode_id = episode.episode_id;
                self.navigate_to(episode_id)
            }
            None => Vec::new(),
        }
    }

    fn load_sources_effect(&self) -> WatchEffect {
        WatchEffect::LoadSources {
            episode_id: self.current_episode().episode_id,
            prefetch: self.episodes.get(self.index + 1).map(|e| e.episode_id),
        }
    }

    fn save_effect(&self, save: PositionSave) -> Option<WatchEffect> {
        match save {
            PositionSave::Remote {
                anime_id,
                episode_id,
                position,
            } => Some(WatchEffect::SaveRemote(WatchedUpdate {
                anime_id,
                episode_id,
                watched_time: position,
            })),
            PositionSave::Local {
                anime_id,
                episode_id,
                position,
            } => {
                let episode = self.episodes.find(episode_id)?.clone();
                Some(WatchEffect::SaveLocal(WatchedRecord {
                    anime_id,
                    episode_id,
                    watched_time: position,
                    episode: Some(episode),
                    anime: Some(self.anime.clone()),
                    updated_at: Utc::now(),
                }))
            }
        }
    }
}
