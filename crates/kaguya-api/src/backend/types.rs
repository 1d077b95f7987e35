use kaguya_core::models::Source;
use serde::{Deserialize, Serialize};

/// Columns of a title with its episodes embedded through the `anime_id` key.
pub const ANIME_WITH_EPISODES: &str = "ani_id,title,vietnamese_title,description,banner_image,\
                                       cover_image,genres,average_score,favourites,\
                                       episodes!anime_id(*)";

/// Columns needed to render a catalog card.
pub const ANIME_CARD: &str =
    "ani_id,title,vietnamese_title,cover_image,genres,average_score,favourites";

/// Body of the source endpoint.
#[derive(Debug, Deserialize)]
pub struct SourceResponse {
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Row written to the `watched` table.
#[derive(Debug, Serialize)]
pub struct WatchedRow {
    pub anime_id: i64,
    pub episode_id: i64,
    pub watched_time: f64,
}

#[cfg(test)]
mod tests {
    use kaguya_core::models::{Anime, RemoteWatched};

    use super::*;

    #[test]
    fn test_anime_with_episodes_parses() {
        let json = r##"[{
            "ani_id": 21,
            "title": { "user_preferred": "ONE PIECE", "romaji": "ONE PIECE", "english": null, "native": "ワンピース" },
            "vietnamese_title": "Đảo Hải Tặc",
            "description": "Gol D. Roger...",
            "banner_image": "https://img.example/banner.jpg",
            "cover_image": { "extra_large": "https://img.example/xl.jpg", "color": "#e4a15d" },
            "genres": ["Action", "Adventure"],
            "average_score": 88,
            "favourites": 70123,
            "episodes": [
                { "episode_id": 502, "name": "Tập 2", "thumbnail_image": null, "anime_id": 21 },
                { "episode_id": 501, "name": "Tập 1", "anime_id": 21 }
            ]
        }]"##;
        let rows: Vec<Anime> = serde_json::from_str(json).unwrap();
        assert_eq!(rows.len(), 1);
        let anime = &rows[0];
        assert_eq!(anime.display_title(), "Đảo Hải Tặc");
        assert_eq!(anime.episodes.len(), 2);
        assert_eq!(anime.cover_image.color.as_deref(), Some("#e4a15d"));
    }

    #[test]
    fn test_source_response_parses() {
        let json = r#"{ "sources": [
            { "file": "https://cdn.example/ep1/1080.m3u8", "label": "1080p" },
            { "file": "https://cdn.example/ep1/720.m3u8", "label": "720p" }
        ] }"#;
        let resp: SourceResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.sources.len(), 2);
        assert_eq!(resp.sources[0].label, "1080p");

        let empty: SourceResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.sources.is_empty());
    }

    #[test]
    fn test_watched_row_parses_without_time() {
        let rows: Vec<RemoteWatched> =
            serde_json::from_str(r#"[{ "anime_id": 21, "episode_id": 502, "watched_time": null }]"#)
                .unwrap();
        assert_eq!(rows[0].watched_time, None);
    }
}
