use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::KaguyaError;
use crate::models::{Anime, Episode, WatchedRecord};

const SCHEMA_V1: &str = include_str!("../../../migrations/001_watched.sql");

/// SQLite-backed local watch store.
pub struct Storage {
    conn: Connection,
}

impl Storage {
    /// Open (or create) the database at the given path and run migrations.
    pub fn open(path: &Path) -> Result<Self, KaguyaError> {
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for tests).
    pub fn open_memory() -> Result<Self, KaguyaError> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;
        Ok(Self { conn })
    }

    // ── Watched records ─────────────────────────────────────────

    /// Insert the record, replacing any existing record for the same title.
    pub fn upsert_watched(&self, record: &WatchedRecord) -> Result<(), KaguyaError> {
        let episode_json = record
            .episode
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let anime_json = record
            .anime
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        self.conn.execute(
            "INSERT INTO watched (anime_id, episode_id, watched_time, episode, anime, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)
             ON CONFLICT(anime_id) DO UPDATE SET
                episode_id = excluded.episode_id,
                watched_time = excluded.watched_time,
                episode = excluded.episode,
                anime = excluded.anime,
                updated_at = excluded.updated_at",
            params![
                record.anime_id,
                record.episode_id,
                record.watched_time,
                episode_json,
                anime_json,
                record.updated_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            ],
        )?;
        Ok(())
    }

    pub fn get_watched(&self, anime_id: i64) -> Result<Option<WatchedRecord>, KaguyaError> {
        self.conn
            .query_row(
                "SELECT anime_id, episode_id, watched_time, episode, anime, updated_at
                 FROM watched WHERE anime_id = ?1",
                params![anime_id],
                |row| Ok(row_to_watched(row)),
            )
            .optional()
            .map_err(Into::into)
    }

    /// Most recently watched titles first.
    pub fn recent_watched(&self, limit: u32) -> Result<Vec<WatchedRecord>, KaguyaError> {
        let mut stmt = self.conn.prepare(
            "SELECT anime_id, episode_id, watched_time, episode, anime, updated_at
             FROM watched ORDER BY updated_at DESC LIMIT ?1",
        )?;
        let rows = stmt
            .query_map(params![limit], |row| Ok(row_to_watched(row)))?
            .filter_map(|r| r.ok())
            .collect();
        Ok(rows)
    }

    pub fn count_watched(&self) -> Result<u64, KaguyaError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM watched", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

// ── Migrations ──────────────────────────────────────────────────

/// Run schema migrations using `PRAGMA user_version` for version tracking.
fn run_migrations(conn: &Connection) -> Result<(), KaguyaError> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .unwrap_or(0);

    if version < 1 {
        conn.execute_batch(SCHEMA_V1)?;
        conn.pragma_update(None, "user_version", 1)?;
        tracing::info!(from = version, to = 1, "applied storage migration");
    }
    Ok(())
}

// ── Row mapping helpers ─────────────────────────────────────────

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_default()
}

/// Snapshots are best effort; a record with an unreadable one is still listed.
fn parse_snapshot<T: serde::de::DeserializeOwned>(json: &str) -> Option<T> {
    serde_json::from_str(json)
        .map_err(|e| tracing::warn!(error = %e, "unreadable watched snapshot"))
        .ok()
}

fn row_to_watched(row: &rusqlite::Row<'_>) -> WatchedRecord {
    let episode_str: Option<String> = row.get(3).unwrap_or(None);
    let anime_str: Option<String> = row.get(4).unwrap_or(None);
    let updated_str: String = row.get(5).unwrap_or_default();

    WatchedRecord {
        anime_id: row.get(0).unwrap_or(0),
        episode_id: row.get(1).unwrap_or(0),
        watched_time: row.get(2).unwrap_or(0.0),
        episode: episode_str.and_then(|s| parse_snapshot::<Episode>(&s)),
        anime: anime_str.and_then(|s| parse_snapshot::<Anime>(&s)),
        updated_at: parse_datetime(&updated_str),
    }
}
