//! Episode ordering and adjacent-episode navigation.

use crate::models::Episode;
use crate::ordinal::EpisodeOrdinal;

/// OS media-session track signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKey {
    PreviousTrack,
    NextTrack,
}

/// Episodes of a title in ascending ordinal order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EpisodeList {
    episodes: Vec<Episode>,
}

impl EpisodeList {
    /// Stable sort by the ordinal parsed from each name; unparsable names go last.
    pub fn sorted(mut episodes: Vec<Episode>) -> Self {
        episodes.sort_by_cached_key(|e| EpisodeOrdinal::of(&e.name));
        Self { episodes }
    }

    pub fn len(&self) -> usize {
        self.episodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.episodes.is_empty()
    }

    pub fn first(&self) -> Option<&Episode> {
        self.episodes.first()
    }

    pub fn get(&self, index: usize) -> Option<&Episode> {
        self.episodes.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Episode> {
        self.episodes.iter()
    }

    pub fn as_slice(&self) -> &[Episode] {
        &self.episodes
    }

    pub fn position_of(&self, episode_id: i64) -> Option<usize> {
        self.episodes.iter().position(|e| e.episode_id == episode_id)
    }

    pub fn find(&self, episode_id: i64) -> Option<&Episode> {
        self.episodes.iter().find(|e| e.episode_id == episode_id)
    }

    /// Cursor at `target`, or at the first episode when no target is given.
    pub fn resolve(&self, target: Option<i64>) -> Option<EpisodeCursor<'_>> {
        let index = match target {
            Some(id) => self.position_of(id)?,
            None if self.episodes.is_empty() => return None,
            None => 0,
        };
        Some(EpisodeCursor { list: self, index })
    }

    /// Episode a media key moves to from `index`. `None` at the boundaries.
    pub fn adjacent(&self, index: usize, key: MediaKey) -> Option<&Episode> {
        match key {
            MediaKey::PreviousTrack => index.checked_sub(1).and_then(|i| self.get(i)),
            MediaKey::NextTrack => index.checked_add(1).and_then(|i| self.get(i)),
        }
    }
}

/// Position of the current episode within an [`EpisodeList`].
#[derive(Debug, Clone, Copy)]
pub struct EpisodeCursor<'a> {
    list: &'a EpisodeList,
    index: usize,
}

impl<'a> EpisodeCursor<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> &'a Episode {
        &self.list.episodes[self.index]
    }

    pub fn next(&self) -> Option<&'a Episode> {
        self.list.adjacent(self.index, MediaKey::NextTrack)
    }

    pub fn previous(&self) -> Option<&'a Episode> {
        self.list.adjacent(self.index, MediaKey::PreviousTrack)
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ep(id: i64, name: &str) -> Episode {
        Episode {
            episode_id: id,
            name: name.into(),
            thumbnail_image: None,
            anime_id: 1,
        }
    }

    fn ids(list: &EpisodeList) -> Vec<i64> {
        list.iter().map(|e| e.episode_id).collect()
    }

    fn sample() -> EpisodeList {
        EpisodeList::sorted(vec![
            ep(30, "Tập 3"),
            ep(99, "Special"),
            ep(10, "Tập 1"),
            ep(120, "Tập 12"),
            ep(20, "Tập 2"),
        ])
    }

    #[test]
    fn test_sorts_numerically_with_unparsable_last() {
        assert_eq!(ids(&sample()), vec![10, 20, 30, 120, 99]);
    }

    #[test]
    fn test_unparsable_after_huge_numbers() {
        let list = EpisodeList::sorted(vec![ep(1, "Recap"), ep(2, "Tập 10000")]);
        assert_eq!(ids(&list), vec![2, 1]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let list = EpisodeList::sorted(vec![ep(5, "OVA"), ep(6, "Movie"), ep(7, "Tập 1")]);
        assert_eq!(ids(&list), vec![7, 5, 6]);
    }

    #[test]
    fn test_resolve_defaults_to_first() {
        let list = sample();
        let cursor = list.resolve(None).unwrap();
        assert_eq!(cursor.index(), 0);
        assert_eq!(cursor.current().episode_id, 10);
        assert!(cursor.previous().is_none());
        assert_eq!(cursor.next().map(|e| e.episode_id), Some(20));
    }

    #[test]
    fn test_resolve_target() {
        let list = sample();
        let cursor = list.resolve(Some(30)).unwrap();
        assert_eq!(cursor.index(), 2);
        assert_eq!(cursor.previous().map(|e| e.episode_id), Some(20));
        assert_eq!(cursor.next().map(|e| e.episode_id), Some(120));
        assert!(!cursor.is_last());
    }

    #[test]
    fn test_resolve_last_has_no_next() {
        let list = sample();
        let cursor = list.resolve(Some(99)).unwrap();
        assert!(cursor.is_last());
        assert!(cursor.next().is_none());
    }

    #[test]
    fn test_resolve_unknown_or_empty() {
        assert!(sample().resolve(Some(12345)).is_none());
        assert!(EpisodeList::default().resolve(None).is_none());
    }

    #[test]
    fn test_media_keys_noop_at_boundaries() {
        let list = sample();
        assert!(list.adjacent(0, MediaKey::PreviousTrack).is_none());
        assert!(list.adjacent(4, MediaKey::NextTrack).is_none());
        assert_eq!(
            list.adjacent(1, MediaKey::NextTrack).map(|e| e.episode_id),
            Some(30)
        );
        assert_eq!(
            list.adjacent(1, MediaKey::PreviousTrack).map(|e| e.episode_id),
            Some(10)
        );
    }
}
