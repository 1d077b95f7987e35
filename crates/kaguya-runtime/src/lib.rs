mod db;
pub mod route;
pub mod scope;
pub mod session;
pub mod snapshot;
pub mod sources;
pub mod watch;

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

use tracing::{debug, warn};

use kaguya_api::CatalogService;
use kaguya_core::catalog::CardView;
use kaguya_core::config::AppConfig;
use kaguya_core::models::{Anime, SourceList, WatchedRecord};

pub use db::DbHandle;
pub use route::{RouteChange, Router, WatchRoute};
pub use session::{PageOutput, WatchSession};
pub use watch::{PageInput, PageMeta, PageView, WatchEffect, WatchPage};

use snapshot::{Lookup, SnapshotCache};
use sources::SourceCache;

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("config error: {0}")]
    Config(String),
    #[error("database error: {0}")]
    Database(String),
    #[error("api error: {0}")]
    Api(String),
    #[error("not found: {0}")]
    NotFound(String),
}

/// Shared services behind every page: the backend, the local store and
/// the title and source caches. Clones are cheap and share state.
pub struct Runtime<S> {
    service: Arc<S>,
    db: DbHandle,
    config: Arc<AppConfig>,
    snapshots: Arc<Mutex<SnapshotCache>>,
    sources: Arc<Mutex<SourceCache>>,
}

impl<S> Clone for Runtime<S> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            db: self.db.clone(),
            config: Arc::clone(&self.config),
            snapshots: Arc::clone(&self.snapshots),
            sources: Arc::clone(&self.sources),
        }
    }
}

impl<S: CatalogService + 'static> Runtime<S> {
    pub fn new(service: S, db: DbHandle, config: AppConfig) -> Self {
        Self {
            service: Arc::new(service),
            db,
            snapshots: Arc::new(Mutex::new(SnapshotCache::new(
                config.watch.revalidate_after(),
            ))),
            sources: Arc::new(Mutex::new(SourceCache::new())),
            config: Arc::new(config),
        }
    }

    pub fn service(&self) -> &Arc<S> {
        &self.service
    }

    pub fn db(&self) -> &DbHandle {
        &self.db
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Mount the watch page for `route` and wrap it in a session.
    pub async fn open_watch(
        &self,
        route: WatchRoute,
        viewport_width: f32,
    ) -> Result<WatchSession<S>, RuntimeError> {
        let page = WatchPage::mount(self, route, viewport_width).await?;
        Ok(WatchSession::new(self.clone(), page))
    }

    /// Title snapshot. Stale snapshots are served while a single background
    /// refresh runs; a failed refresh keeps the old one.
    pub async fn title(&self, ani_id: i64) -> Result<Anime, RuntimeError> {
        let lookup = lock(&self.snapshots).lookup(ani_id, now());
        match lookup {
            Lookup::Fresh(anime) => Ok(anime),
            Lookup::Stale(anime) => {
                let claimed = lock(&self.snapshots).begin_revalidate(ani_id);
                if claimed {
                    let runtime = self.clone();
                    tokio::spawn(async move { runtime.revalidate(ani_id).await });
                }
                Ok(anime)
            }
            Lookup::Miss => self.fetch_title(ani_id).await,
        }
    }

    async fn fetch_title(&self, ani_id: i64) -> Result<Anime, RuntimeError> {
        match self.service.get_anime(ani_id).await {
            Ok(anime) => {
                lock(&self.snapshots).store(anime.clone(), now());
                Ok(anime)
            }
            Err(e) => {
                warn!(ani_id, error = %e, "title fetch failed");
                Err(RuntimeError::NotFound(format!("anime {ani_id}")))
            }
        }
    }

    async fn revalidate(&self, ani_id: i64) {
        match self.service.get_anime(ani_id).await {
            Ok(anime) => {
                debug!(ani_id, "title snapshot revalidated");
                lock(&self.snapshots).store(anime, now());
            }
            Err(e) => {
                warn!(ani_id, error = %e, "title revalidation failed, keeping snapshot");
                lock(&self.snapshots).revalidate_failed(ani_id);
            }
        }
    }

    pub fn cached_sources(&self, episode_id: i64) -> Option<SourceList> {
        lock(&self.sources).get(episode_id).cloned()
    }

    /// Sources for `episode_id`, from the cache when possible. `None` when
    /// the fetch fails or the backend has nothing playable.
    pub async fn sources(&self, episode_id: i64) -> Option<SourceList> {
        if let Some(list) = self.cached_sources(episode_id) {
            return Some(list);
        }
        match self.service.get_sources(episode_id).await {
            Ok(sources) => match SourceList::new(sources) {
                Some(list) => {
                    lock(&self.sources).insert(episode_id, list.clone());
                    Some(list)
                }
                None => {
                    warn!(episode_id, "no sources for episode, keeping placeholder");
                    None
                }
            },
            Err(e) => {
                warn!(episode_id, error = %e, "source fetch failed, keeping placeholder");
                None
            }
        }
    }

    /// Forget every source list fetched so far.
    pub fn clear_sources(&self) {
        let mut cache = lock(&self.sources);
        debug!(dropped = cache.len(), "source cache cleared");
        cache.clear();
    }

    /// Warm the source cache for an episode the viewer is likely to open next.
    pub async fn prefetch_sources(&self, episode_id: i64) {
        if self.sources(episode_id).await.is_some() {
            debug!(episode_id, "sources prefetched");
        }
    }

    pub async fn recent_titles(&self, limit: u32) -> Result<Vec<CardView>, RuntimeError> {
        let titles = self
            .service
            .recent_anime(limit)
            .await
            .map_err(|e| RuntimeError::Api(e.to_string()))?;
        Ok(titles.iter().map(CardView::from_anime).collect())
    }

    /// Local watch history, most recent first.
    pub async fn history(&self, limit: u32) -> Result<Vec<WatchedRecord>, RuntimeError> {
        self.db
            .recent_watched(limit)
            .await
            .map_err(|e| RuntimeError::Database(e.to_string()))
    }
}

/// Current instant on the tokio clock, so paused-time tests drive every timer.
pub(crate) fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}


#[cfg(test)]
mod tests {
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use kaguya_core::models::Source;

    use super::testing::FakeCatalog;
    use super::*;

    fn anime(description: &str) -> Anime {
        Anime {
            ani_id: 7,
            description: Some(description.into()),
            ..Default::default()
        }
    }

    fn runtime(catalog: FakeCatalog) -> Runtime<FakeCatalog> {
        Runtime::new(catalog, DbHandle::open_memory().unwrap(), AppConfig::default())
    }

    #[tokio::test(start_paused = true)]
    async fn test_title_served_stale_then_revalidated() {
        let rt = runtime(FakeCatalog::with_anime(anime("v1")));
        assert_eq!(rt.title(7).await.unwrap().description.as_deref(), Some("v1"));
        assert_eq!(rt.title(7).await.unwrap().description.as_deref(), Some("v1"));
        assert_eq!(rt.service().anime_fetches.load(Ordering::SeqCst), 1);

        rt.service().anime.lock().unwrap().insert(7, anime("v2"));
        tokio::time::advance(Duration::from_secs(61)).await;

        // Stale hit is served immediately; the refresh lands afterwards.
        assert_eq!(rt.title(7).await.unwrap().description.as_deref(), Some("v1"));
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(rt.title(7).await.unwrap().description.as_deref(), Some("v2"));
        assert_eq!(rt.service().anime_fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_revalidation_keeps_snapshot() {
        let rt = runtime(FakeCatalog::with_anime(anime("v1")));
        rt.title(7).await.unwrap();
        *rt.service().fail_anime.lock().unwrap() = true;
        tokio::time::advance(Duration::from_secs(61)).await;

        assert_eq!(rt.title(7).await.unwrap().description.as_deref(), Some("v1"));
        tokio::time::sleep(Duration::from_millis(1)).await;
        assert_eq!(rt.title(7).await.unwrap().description.as_deref(), Some("v1"));
    }

    #[tokio::test]
    async fn test_missing_title_is_not_found() {
        let rt = runtime(FakeCatalog::default());
        assert!(matches!(rt.title(1).await, Err(RuntimeError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_sources_cached_and_empty_rejected() {
        let mut catalog = FakeCatalog::default();
        catalog
            .sources
            .insert(1, vec![Source::new("https://cdn.test/1.m3u8", "1080p")]);
        catalog.sources.insert(2, Vec::new());
        let rt = runtime(catalog);

        assert!(rt.cached_sources(1).is_none());
        rt.prefetch_sources(1).await;
        assert_eq!(rt.cached_sources(1).unwrap().primary().label, "1080p");
        assert!(rt.sources(2).await.is_none());
        assert!(rt.sources(3).await.is_none());
    }
}
