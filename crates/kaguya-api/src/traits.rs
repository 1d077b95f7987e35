//! Trait definition for the remote catalog backend.
//!
//! The watch page and CLI only talk to the backend through this trait, so
//! tests can swap in an in-memory catalog.

use std::future::Future;

use kaguya_core::models::{Anime, RemoteWatched, Source, WatchedUpdate};

/// Catalog, stream and watched-position backend.
pub trait CatalogService: Send + Sync {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Title with its full episode list.
    fn get_anime(&self, ani_id: i64) -> impl Future<Output = Result<Anime, Self::Error>> + Send;

    /// Playable sources for one episode, best quality first.
    fn get_sources(
        &self,
        episode_id: i64,
    ) -> impl Future<Output = Result<Vec<Source>, Self::Error>> + Send;

    /// The signed-in user's saved position for a title, if any.
    fn get_watched(
        &self,
        ani_id: i64,
    ) -> impl Future<Output = Result<Option<RemoteWatched>, Self::Error>> + Send;

    /// Upsert the saved position for `(anime_id, episode_id)`.
    fn save_watched(
        &self,
        update: &WatchedUpdate,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Most recently updated titles, without episodes.
    fn recent_anime(
        &self,
        limit: u32,
    ) -> impl Future<Output = Result<Vec<Anime>, Self::Error>> + Send;
}
