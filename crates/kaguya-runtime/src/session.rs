//! The event loop that drives a [`WatchPage`] against a playback engine.

use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use kaguya_api::CatalogService;
use kaguya_core::models::SourceList;
use kaguya_player::engine::{seek_by, toggle_play, PlaybackEngine};

use crate::route::RouteChange;
use crate::scope::ScopedTask;
use crate::watch::{PageInput, PageView, WatchEffect, WatchPage};
use crate::{now, Runtime};

/// Sleep used for the timer branch while no deadline is pending.
const IDLE: Duration = Duration::from_secs(3600);

/// What the session reports back to the host.
#[derive(Debug, Clone, PartialEq)]
pub enum PageOutput {
    /// Update the address bar.
    Route(RouteChange),
    /// Re-render with this state.
    View(PageView),
}

type SourcesLoaded = (i64, Option<SourceList>);

pub struct WatchSession<S> {
    runtime: Runtime<S>,
    page: WatchPage,
    /// In-flight source fetch (and prefetch) for the current episode.
    fetch: Option<ScopedTask>,
}

impl<S: CatalogService + 'static> WatchSession<S> {
    pub fn new(runtime: Runtime<S>, page: WatchPage) -> Self {
        Self {
            runtime,
            page,
            fetch: None,
        }
    }

    pub fn page(&self) -> &WatchPage {
        &self.page
    }

    /// Run until the host sends [`PageInput::Close`] or drops its sender.
    ///
    /// The engine listener, any in-flight fetch and the cached source lists
    /// are released on return.
    pub async fn run<E>(
        mut self,
        engine: &mut E,
        mut inputs: UnboundedReceiver<PageInput>,
        outputs: UnboundedSender<PageOutput>,
    ) -> WatchPage
    where
        E: PlaybackEngine + Send,
    {
        let (event_tx, mut events) = mpsc::unbounded_channel();
        let _subscription = engine.events().subscribe(event_tx);
        let (loaded_tx, mut loaded) = mpsc::unbounded_channel::<SourcesLoaded>();
        info!(route = %self.page.route(), "watch session started");

        let effects = self.page.start();
        self.apply(effects, engine, &loaded_tx, &outputs).await;
        let _ = outputs.send(PageOutput::View(self.page.view(now())));

        loop {
            let deadline = self.page.deadline();
            let wake = deadline
                .map(tokio::time::Instant::from_std)
                .unwrap_or_else(|| tokio::time::Instant::now() + IDLE);

            tokio::select! {
                Some(event) = events.recv() => {
                    let effects = self.page.on_playback(now(), event, engine.current_time());
                    self.apply(effects, engine, &loaded_tx, &outputs).await;
                }
                Some((episode_id, sources)) = loaded.recv() => {
                    if let Some(list) = self.page.on_sources_loaded(episode_id, sources) {
                        engine.load(&list);
                    }
                }
                input = inputs.recv() => {
                    let Some(input) = input.filter(|i| *i != PageInput::Close) else {
                        break;
                    };
                    let effects = self.page.on_input(now(), input);
                    self.apply(effects, engine, &loaded_tx, &outputs).await;
                }
                _ = tokio::time::sleep_until(wake), if deadline.is_some() => {
                    let effects = self.page.tick(now(), engine.current_time());
                    self.apply(effects, engine, &loaded_tx, &outputs).await;
                }
            }

            let _ = outputs.send(PageOutput::View(self.page.view(now())));
        }

        self.fetch = None;
        self.runtime.clear_sources();
        info!(route = %self.page.route(), "watch session closed");
        self.page
    }

    async fn apply<E: PlaybackEngine>(
        &mut self,
        effects: Vec<WatchEffect>,
        engine: &mut E,
        loaded_tx: &UnboundedSender<SourcesLoaded>,
        outputs: &UnboundedSender<PageOutput>,
    ) {
        for effect in effects {
            match effect {
                WatchEffect::SaveRemote(update) => {
                    let service = std::sync::Arc::clone(self.runtime.service());
                    tokio::spawn(async move {
                        match service.save_watched(&update).await {
                            Ok(()) => debug!(
                                episode_id = update.episode_id,
                                position = update.watched_time,
                                "position saved"
                            ),
                            Err(e) => warn!(
                                episode_id = update.episode_id,
                                error = %e,
                                "remote position save dropped"
                            ),
                        }
                    });
                }
                WatchEffect::SaveLocal(record) => {
                    if let Err(e) = self.runtime.db().upsert_watched(record).await {
                        warn!(error = %e, "local position save dropped");
                    }
                }
                WatchEffect::Seek(position) => engine.set_current_time(position),
                WatchEffect::SeekBy(delta) => {
                    let position = seek_by(engine, delta);
                    debug!(delta, position, "seek");
                }
                WatchEffect::TogglePlay => toggle_play(engine),
                WatchEffect::LoadSources {
                    episode_id,
                    prefetch,
                } => self.load_sources(engine, episode_id, prefetch, loaded_tx),
                WatchEffect::Navigated(change) => {
                    let _ = outputs.send(PageOutput::Route(change));
                }
            }
        }
    }

    /// Cached sources load straight away. Otherwise the placeholder plays
    /// while the fetch runs; any previous fetch is aborted.
    fn load_sources<E: PlaybackEngine>(
        &mut self,
        engine: &mut E,
        episode_id: i64,
        prefetch: Option<i64>,
        loaded_tx: &UnboundedSender<SourcesLoaded>,
    ) {
        let runtime = self.runtime.clone();

        if let Some(cached) = self.runtime.cached_sources(episode_id) {
            if let Some(list) = self.page.on_sources_loaded(episode_id, Some(cached)) {
                engine.load(&list);
            }
            self.fetch = prefetch.map(|next| {
                ScopedTask::spawn(async move { runtime.prefetch_sources(next).await })
            });
            return;
        }

        engine.load(self.page.sources());
        let tx = loaded_tx.clone();
        self.fetch = Some(ScopedTask::spawn(async move {
            let sources = runtime.sources(episode_id).await;
            let _ = tx.send((episode_id, sources));
            if let Some(next) = prefetch {
                runtime.prefetch_sources(next).await;
            }
        }));
    }
}
