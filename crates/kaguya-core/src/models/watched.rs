use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Anime, Episode};

/// Local watch snapshot. One record per title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedRecord {
    pub anime_id: i64,
    pub episode_id: i64,
    /// Playback position in seconds.
    pub watched_time: f64,
    pub episode: Option<Episode>,
    pub anime: Option<Anime>,
    pub updated_at: DateTime<Utc>,
}

/// The backend's watched row for a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteWatched {
    pub anime_id: i64,
    pub episode_id: i64,
    #[serde(default)]
    pub watched_time: Option<f64>,
}

/// Payload of a periodic remote position save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WatchedUpdate {
    pub anime_id: i64,
    pub episode_id: i64,
    pub watched_time: f64,
}
