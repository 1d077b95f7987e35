//! Title snapshots with stale-while-revalidate semantics.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use kaguya_core::models::Anime;

/// Result of a cache lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    /// Younger than the revalidation interval.
    Fresh(Anime),
    /// Served as-is while a refresh is fetched.
    Stale(Anime),
    Miss,
}

#[derive(Debug)]
struct Snapshot {
    anime: Anime,
    fetched_at: Instant,
    revalidating: bool,
}

#[derive(Debug)]
pub struct SnapshotCache {
    revalidate_after: Duration,
    entries: HashMap<i64, Snapshot>,
}

impl SnapshotCache {
    pub fn new(revalidate_after: Duration) -> Self {
        Self {
            revalidate_after,
            entries: HashMap::new(),
        }
    }

    pub fn lookup(&self, ani_id: i64, now: Instant) -> Lookup {
        match self.entries.get(&ani_id) {
            Some(s) if now.duration_since(s.fetched_at) < self.revalidate_after => {
                Lookup::Fresh(s.anime.clone())
            }
            Some(s) => Lookup::Stale(s.anime.clone()),
            None => Lookup::Miss,
        }
    }

    /// Claim the refresh of a stale entry. Only the first caller gets `true`
    /// until the entry is stored again.
    pub fn begin_revalidate(&mut self, ani_id: i64) -> bool {
        match self.entries.get_mut(&ani_id) {
            Some(s) if !s.revalidating => {
                s.revalidating = true;
                true
            }
            _ => false,
        }
    }

    /// A failed refresh keeps serving the old snapshot.
    pub fn revalidate_failed(&mut self, ani_id: i64) {
        if let Some(s) = self.entries.get_mut(&ani_id) {
            s.revalidating = false;
        }
    }

    pub fn store(&mut self, anime: Anime, now: Instant) {
        self.entries.insert(
            anime.ani_id,
            Snapshot {
                anime,
                fetched_at: now,
                revalidating: false,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
