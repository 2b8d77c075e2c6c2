//! Episode references and the title listing they are enumerated from.

use serde::{Deserialize, Serialize};

/// Title used when a listing carries no usable name.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// One episode page to process. Season and number stay strings so labels
/// like "OVA" or "12.5" survive untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EpisodeRef {
    pub season: String,
    pub number: String,
    /// Opaque locator handed to the media resolver.
    #[serde(alias = "url")]
    pub page_url: String,
}

impl EpisodeRef {
    pub fn new(
        season: impl Into<String>,
        number: impl Into<String>,
        page_url: impl Into<String>,
    ) -> Self {
        Self {
            season: season.into(),
            number: number.into(),
            page_url: page_url.into(),
        }
    }
}

/// Episodes of one season as listed by a details source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonListing {
    pub season_number: String,
    #[serde(default)]
    pub episodes: Vec<EpisodeRef>,
}

/// Result of details resolution: the title name and its episodes in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleDetails {
    pub title: String,
    pub episodes: Vec<EpisodeRef>,
}

impl TitleDetails {
    /// Flattens seasons in the given order, keeping episode order within each season.
    pub fn from_seasons(title: &str, seasons: Vec<SeasonListing>) -> Self {
        let episodes = seasons.into_iter().flat_map(|s| s.episodes).collect();
        Self {
            title: normalize_title(title),
            episodes,
        }
    }
}

/// Normalizes a scraped title for use as a job title: `/` becomes `-`,
/// surrounding whitespace is trimmed, and an empty result becomes [`UNKNOWN_TITLE`].
pub fn normalize_title(raw: &str) -> String {
    let t = raw.replace('/', "-");
    let t = t.trim();
    if t.is_empty() {
        UNKNOWN_TITLE.to_string()
    } else {
        t.to_string()
    }
}
