//! Watch page URLs.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

const PREFIX: &str = "/anime/watch/";

/// `/anime/watch/{anime}[/{episode}]`. Without an episode the first sorted
/// episode is watched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchRoute {
    pub anime_id: i64,
    pub episode_id: Option<i64>,
}

impl WatchRoute {
    pub fn new(anime_id: i64, episode_id: Option<i64>) -> Self {
        Self {
            anime_id,
            episode_id,
        }
    }

    pub fn with_episode(self, episode_id: i64) -> Self {
        Self {
            episode_id: Some(episode_id),
            ..self
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a watch route: {0}")]
pub struct RouteParseError(String);

impl FromStr for WatchRoute {
    type Err = RouteParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RouteParseError(s.to_string());
        let path = s.split(['?', '#']).next().unwrap_or_default();
        let rest = path.strip_prefix(PREFIX).ok_or_else(invalid)?;
        let mut segments = rest.split('/').filter(|seg| !seg.is_empty());

        let anime_id = segments
            .next()
            .and_then(|seg| seg.parse().ok())
            .ok_or_else(invalid)?;
        let episode_id = match segments.next() {
            Some(seg) => Some(seg.parse().map_err(|_| invalid())?),
            None => None,
        };
        if segments.next().is_some() {
            return Err(invalid());
        }

        Ok(Self::new(anime_id, episode_id))
    }
}

impl fmt::Display for WatchRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.episode_id {
            Some(episode_id) => write!(f, "{PREFIX}{}/{episode_id}", self.anime_id),
            None => write!(f, "{PREFIX}{}", self.anime_id),
        }
    }
}

/// A URL update for the host. Episode switches are always shallow (no page
/// reload) and replace the history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteChange {
    pub route: WatchRoute,
    pub shallow: bool,
    pub replace: bool,
}

#[derive(Debug, Clone)]
pub struct Router {
    current: WatchRoute,
}

impl Router {
    pub fn new(current: WatchRoute) -> Self {
        Self { current }
    }

    pub fn current(&self) -> WatchRoute {
        self.current
    }

    /// Yields nothing when already at `route`.
    pub fn navigate(&mut self, route: WatchRoute) -> Option<RouteChange> {
        if route == self.current {
            debug!(%route, "already at route");
            return None;
        }
        self.current = route;
        Some(RouteChange {
            route,
            shallow: true,
            replace: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_format() {
        let route: WatchRoute = "/anime/watch/21/1043".parse().unwrap();
        assert_eq!(route, WatchRoute::new(21, Some(1043)));
        assert_eq!(route.to_string(), "/anime/watch/21/1043");

        let bare: WatchRoute = "/anime/watch/21/?ref=home".parse().unwrap();
        assert_eq!(bare, WatchRoute::new(21, None));
        assert_eq!(bare.to_string(), "/anime/watch/21");
    }

    #[test]
    fn test_parse_rejects_other_paths() {
        assert!("/details/21".parse::<WatchRoute>().is_err());
        assert!("/anime/watch/abc".parse::<WatchRoute>().is_err());
        assert!("/anime/watch/21/x".parse::<WatchRoute>().is_err());
        assert!("/anime/watch/21/1/2".parse::<WatchRoute>().is_err());
        assert!("/anime/watch/".parse::<WatchRoute>().is_err());
    }

    #[test]
    fn test_navigate_is_shallow_replace_and_dedupes() {
        let mut router = Router::new(WatchRoute::new(21, Some(1)));
        assert_eq!(router.navigate(WatchRoute::new(21, Some(1))), None);

        let change = router.navigate(WatchRoute::new(21, Some(2))).unwrap();
        assert!(change.shallow && change.replace);
        assert_eq!(router.current().episode_id, Some(2));
        assert_eq!(router.navigate(WatchRoute::new(21, Some(2))), None);
    }
}
