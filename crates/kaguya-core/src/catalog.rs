//! Display values for catalog cards.

use crate::models::Anime;

/// Page background the card accent color is checked against.
pub const CARD_BACKGROUND: &str = "#3a3939";

/// Accent used when the cover color would be unreadable.
pub const FALLBACK_ACCENT: &str = "white";

/// Minimum WCAG contrast ratio for an accent to count as visible.
const MIN_CONTRAST: f64 = 3.0;

const MAX_GENRES: usize = 2;

/// Everything a catalog card renders, precomputed.
#[derive(Debug, Clone, PartialEq)]
pub struct CardView {
    pub ani_id: i64,
    pub title: String,
    pub cover_url: Option<String>,
    pub accent: String,
    pub genres: Vec<String>,
    pub score_label: Option<String>,
    pub favourites_label: Option<String>,
    pub href: String,
}

impl CardView {
    pub fn from_anime(anime: &Anime) -> Self {
        let accent = anime
            .cover_image
            .color
            .as_deref()
            .filter(|c| is_color_visible(c, CARD_BACKGROUND))
            .unwrap_or(FALLBACK_ACCENT)
            .to_string();

        Self {
            ani_id: anime.ani_id,
            title: anime.title.preferred().to_string(),
            cover_url: anime
                .cover_image
                .extra_large
                .clone()
                .or_else(|| anime.cover_image.large.clone()),
            accent,
            genres: anime.genres.iter().take(MAX_GENRES).cloned().collect(),
            score_label: anime.average_score.map(|s| format!("{s}%")),
            favourites_label: anime.favourites.map(|f| format_thousands(f as u64)),
            href: format!("/details/{}", anime.ani_id),
        }
    }
}

/// `1234567` → `"1,234,567"`.
pub fn format_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Whether `color` stands out against `background`. Unparsable colors are not visible.
pub fn is_color_visible(color: &str, background: &str) -> bool {
    match (parse_hex(color), parse_hex(background)) {
        (Some(fg), Some(bg)) => contrast_ratio(fg, bg) >= MIN_CONTRAST,
        _ => false,
    }
}

fn parse_hex(s: &str) -> Option<[u8; 3]> {
    let hex = s.strip_prefix('#').filter(|h| h.is_ascii())?;
    let expanded: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(&expanded[i..i + 2], 16).ok();
    Some([channel(0)?, channel(2)?, channel(4)?])
}

fn relative_luminance([r, g, b]: [u8; 3]) -> f64 {
    let linear = |c: u8| {
        let c = c as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };
    0.2126 * linear(r) + 0.7152 * linear(g) + 0.0722 * linear(b)
}

fn contrast_ratio(a: [u8; 3], b: [u8; 3]) -> f64 {
    let (la, lb) = (relative_luminance(a), relative_luminance(b));
    let (hi, lo) = if la > lb { (la, lb) } else { (lb, la) };
    (hi + 0.05) / (lo + 0.05)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AnimeTitle, CoverImage};

    fn anime(color: Option<&str>) -> Anime {
        Anime {
            ani_id: 154587,
            title: AnimeTitle {
                user_preferred: Some("Sousou no Frieren".into()),
                ..Default::default()
            },
            vietnamese_title: None,
            description: None,
            cover_image: CoverImage {
                extra_large: Some("https://img.example/xl.jpg".into()),
                color: color.map(Into::into),
                ..Default::default()
            },
            banner_image: None,
            genres: vec!["Adventure".into(), "Drama".into(), "Fantasy".into()],
            average_score: Some(91),
            favourites: Some(48213),
            episodes: Vec::new(),
        }
    }

    #[test]
    fn test_format_thousands() {
        assert_eq!(format_thousands(0), "0");
        assert_eq!(format_thousands(999), "999");
        assert_eq!(format_thousands(1000), "1,000");
        assert_eq!(format_thousands(1234567), "1,234,567");
    }

    #[test]
    fn test_color_visibility() {
        assert!(is_color_visible("#f1e4a4", CARD_BACKGROUND));
        assert!(!is_color_visible("#35361a", CARD_BACKGROUND));
        assert!(!is_color_visible("not-a-color", CARD_BACKGROUND));
        assert!(is_color_visible("#fff", CARD_BACKGROUND));
    }

    #[test]
    fn test_non_ascii_color_is_not_visible() {
        assert!(!is_color_visible("#aéaaa", CARD_BACKGROUND));
        assert!(!is_color_visible("#ééé", CARD_BACKGROUND));
        assert_eq!(CardView::from_anime(&anime(Some("#aéaaa"))).accent, "white");
    }

    #[test]
    fn test_card_view() {
        let card = CardView::from_anime(&anime(Some("#f1e4a4")));
        assert_eq!(card.title, "Sousou no Frieren");
        assert_eq!(card.accent, "#f1e4a4");
        assert_eq!(card.genres, vec!["Adventure", "Drama"]);
        assert_eq!(card.score_label.as_deref(), Some("91%"));
        assert_eq!(card.favourites_label.as_deref(), Some("48,213"));
        assert_eq!(card.href, "/details/154587");
    }

    #[test]
    fn test_card_falls_back_to_white() {
        assert_eq!(CardView::from_anime(&anime(Some("#202020"))).accent, "white");
        assert_eq!(CardView::from_anime(&anime(None)).accent, "white");
    }
}
