//! Episode ordinals embedded in free-text episode names.
//!
//! Names look like "Tập 12", "Episode 3 - The Journey" or "OVA"; the first
//! run of digits is the ordinal. Names without one sort after every
//! numbered episode.

use std::cmp::Ordering;
use std::sync::LazyLock;

use regex::Regex;

/// Sort value reported for names with no parsable number.
pub const ORDINAL_SENTINEL: u64 = 9999;

static RE_NUMBER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").unwrap());

/// Every run of ASCII digits in `text`, in order of appearance.
///
/// Runs that overflow `u64` are skipped.
pub fn parse_numbers(text: &str) -> Vec<u64> {
    RE_NUMBER
        .find_iter(text)
        .filter_map(|m| m.as_str().parse().ok())
        .collect()
}

/// Ordinal of an episode name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EpisodeOrdinal {
    Parsed(u64),
    Missing,
}

impl EpisodeOrdinal {
    pub fn of(name: &str) -> Self {
        parse_numbers(name)
            .first()
            .copied()
            .map_or(Self::Missing, Self::Parsed)
    }

    pub fn sort_value(self) -> u64 {
        match self {
            Self::Parsed(n) => n,
            Self::Missing => ORDINAL_SENTINEL,
        }
    }

    pub fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }
}

impl Ord for EpisodeOrdinal {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Parsed(a), Self::Parsed(b)) => a.cmp(b),
            (Self::Parsed(_), Self::Missing) => Ordering::Less,
            (Self::Missing, Self::Parsed(_)) => Ordering::Greater,
            (Self::Missing, Self::Missing) => Ordering::Equal,
        }
    }
}

impl PartialOrd for EpisodeOrdinal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
