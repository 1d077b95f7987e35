use std::path::Path;

use tokio::sync::{mpsc, oneshot};

use kaguya_core::error::KaguyaError;
use kaguya_core::models::WatchedRecord;
use kaguya_core::storage::Storage;

/// Handle to the storage thread. Clones share one connection.
#[derive(Clone)]
pub struct DbHandle {
    tx: mpsc::UnboundedSender<DbCommand>,
}

enum DbCommand {
    UpsertWatched {
        record: Box<WatchedRecord>,
        reply: oneshot::Sender<Result<(), KaguyaError>>,
    },
    GetWatched {
        anime_id: i64,
        reply: oneshot::Sender<Result<Option<WatchedRecord>, KaguyaError>>,
    },
    RecentWatched {
        limit: u32,
        reply: oneshot::Sender<Result<Vec<WatchedRecord>, KaguyaError>>,
    },
}

impl DbHandle {
    pub fn open(path: &Path) -> Result<Self, KaguyaError> {
        Self::spawn(Storage::open(path)?)
    }

    pub fn open_memory() -> Result<Self, KaguyaError> {
        Self::spawn(Storage::open_memory()?)
    }

    fn spawn(storage: Storage) -> Result<Self, KaguyaError> {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::Builder::new()
            .name("db-actor".into())
            .spawn(move || actor_loop(storage, rx))?;
        Ok(Self { tx })
    }

    pub async fn upsert_watched(&self, record: WatchedRecord) -> Result<(), KaguyaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::UpsertWatched {
            record: Box::new(record),
            reply,
        });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    pub async fn get_watched(&self, anime_id: i64) -> Result<Option<WatchedRecord>, KaguyaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::GetWatched { anime_id, reply });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    /// Most recently updated records first.
    pub async fn recent_watched(&self, limit: u32) -> Result<Vec<WatchedRecord>, KaguyaError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(DbCommand::RecentWatched { limit, reply });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }
}

fn closed() -> KaguyaError {
    KaguyaError::Config("DB actor closed".into())
}

fn actor_loop(storage: Storage, mut rx: mpsc::UnboundedReceiver<DbCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            DbCommand::UpsertWatched { record, reply } => {
                let _ = reply.send(storage.upsert_watched(&record));
            }
            DbCommand::GetWatched { anime_id, reply } => {
                let _ = reply.send(storage.get_watched(anime_id));
            }
            DbCommand::RecentWatched { limit, reply } => {
                let _ = reply.send(storage.recent_watched(limit));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn record(anime_id: i64, episode_id: i64, secs_ago: i64) -> WatchedRecord {
        WatchedRecord {
            anime_id,
            episode_id,
            watched_time: 12.5,
            episode: None,
            anime: None,
            updated_at: Utc::now() - Duration::seconds(secs_ago),
        }
    }

    #[tokio::test]
    async fn test_round_trip_through_actor() {
        let db = DbHandle::open_memory().unwrap();
        db.upsert_watched(record(1, 10, 60)).await.unwrap();
        db.upsert_watched(record(2, 20, 0)).await.unwrap();
        db.upsert_watched(record(1, 11, 30)).await.unwrap();

        let one = db.get_watched(1).await.unwrap().unwrap();
        assert_eq!(one.episode_id, 11);

        let recent = db.recent_watched(10).await.unwrap();
        let ids: Vec<i64> = recent.iter().map(|r| r.anime_id).collect();
        assert_eq!(ids, vec![2, 1]);
    }
}
