//! Per-episode source lists.

use std::collections::HashMap;

use kaguya_core::models::SourceList;

/// Source lists fetched this session, including prefetched ones.
#[derive(Debug, Default)]
pub struct SourceCache {
    entries: HashMap<i64, SourceList>,
}

impl SourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, episode_id: i64) -> Option<&SourceList> {
        self.entries.get(&episode_id)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn insert(&mut self, episode_id: i64, sources: SourceList) {
        self.entries.insert(episode_id, sources);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use kaguya_core::models::Source;

    use super::*;

    #[test]
    fn test_insert_and_clear() {
        let mut cache = SourceCache::new();
        assert!(cache.is_empty());
        let list = SourceList::new(vec![Source::new("https://cdn.test/1.m3u8", "720p")]).unwrap();
        cache.insert(1, list);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(1).unwrap().primary().label, "720p");
        assert!(cache.get(2).is_none());

        cache.clear();
        assert!(cache.is_empty());
    }
}
