use serde::{Deserialize, Serialize};

/// Title variants as returned by the catalog backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimeTitle {
    #[serde(default)]
    pub user_preferred: Option<String>,
    #[serde(default)]
    pub romaji: Option<String>,
    #[serde(default)]
    pub english: Option<String>,
    #[serde(default)]
    pub native: Option<String>,
}

impl AnimeTitle {
    /// Returns the best available display title.
    pub fn preferred(&self) -> &str {
        self.user_preferred
            .as_deref()
            .or(self.romaji.as_deref())
            .or(self.english.as_deref())
            .or(self.native.as_deref())
            .unwrap_or("Unknown")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverImage {
    #[serde(default)]
    pub extra_large: Option<String>,
    #[serde(default)]
    pub large: Option<String>,
    #[serde(default)]
    pub medium: Option<String>,
    /// Accent color as a `#rrggbb` hex string.
    #[serde(default)]
    pub color: Option<String>,
}

/// A single watchable unit of a title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    pub episode_id: i64,
    /// Free text carrying the episode ordinal, e.g. "Tập 12".
    pub name: String,
    #[serde(default)]
    pub thumbnail_image: Option<String>,
    pub anime_id: i64,
}

/// A series with its metadata and episodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Anime {
    pub ani_id: i64,
    #[serde(default)]
    pub title: AnimeTitle,
    #[serde(default)]
    pub vietnamese_title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub cover_image: CoverImage,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub average_score: Option<u32>,
    #[serde(default)]
    pub favourites: Option<u32>,
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

impl Anime {
    /// Title shown on the watch page: the localized title when present.
    pub fn display_title(&self) -> &str {
        self.vietnamese_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| self.title.preferred())
    }

    /// Image used when sharing a page for `episode`.
    pub fn share_image<'a>(&'a self, episode: &'a Episode) -> Option<&'a str> {
        episode
            .thumbnail_image
            .as_deref()
            .or(self.banner_image.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_title_prefers_localized() {
        let json = r#"{
            "ani_id": 1,
            "title": { "user_preferred": "Sousou no Frieren", "english": "Frieren" },
            "vietnamese_title": "Pháp sư tiễn táng"
        }"#;
        let anime: Anime = serde_json::from_str(json).unwrap();
        assert_eq!(anime.display_title(), "Pháp sư tiễn táng");
        assert!(anime.episodes.is_empty());
    }

    #[test]
    fn test_display_title_falls_back() {
        let json = r#"{ "ani_id": 1, "title": { "romaji": "Frieren" }, "vietnamese_title": "  " }"#;
        let anime: Anime = serde_json::from_str(json).unwrap();
        assert_eq!(anime.display_title(), "Frieren");

        let bare: Anime = serde_json::from_str(r#"{ "ani_id": 2 }"#).unwrap();
        assert_eq!(bare.display_title(), "Unknown");
    }
}
