//! Details resolver reading a JSON title manifest from disk or over HTTP.
//!
//! Manifest shape:
//!
//! ```json
//! { "title": "Show", "url": "https://...", "seasons": [
//!   { "season_number": "1", "episodes": [ { "number": "1", "url": "https://..." } ] } ] }
//! ```
//!
//! An episode without `season` inherits its season's `season_number`.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::config::ResolverConfig;
use crate::episode::{EpisodeRef, SeasonListing, TitleDetails};

use super::fetch::{self, FetchOptions};
use super::{DetailsResolver, ResolveError};

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    title: String,
    #[serde(default)]
    seasons: Vec<ManifestSeason>,
}

#[derive(Debug, Deserialize)]
struct ManifestSeason {
    season_number: String,
    #[serde(default)]
    episodes: Vec<ManifestEpisode>,
}

#[derive(Debug, Deserialize)]
struct ManifestEpisode {
    #[serde(default)]
    season: Option<String>,
    number: String,
    url: String,
}

/// Orders one season: duplicates by episode number are dropped (first wins),
/// numeric numbers sort ascending, non-numeric labels follow in listed order.
fn order_season(season_number: &str, episodes: Vec<ManifestEpisode>) -> Vec<EpisodeRef> {
    let mut seen = HashSet::new();
    let mut out: Vec<EpisodeRef> = episodes
        .into_iter()
        .filter(|e| seen.insert(e.number.trim().to_string()))
        .map(|e| EpisodeRef {
            season: e
                .season
                .filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| season_number.to_string()),
            number: e.number,
            page_url: e.url,
        })
        .collect();
    out.sort_by_key(|e| match e.number.trim().parse::<u64>() {
        Ok(n) => (0, n),
        Err(_) => (1, 0),
    });
    out
}

/// Parses manifest JSON. `name` is only used in error messages.
pub fn parse_manifest(json: &str, name: &str) -> Result<TitleDetails, ResolveError> {
    let manifest: Manifest = serde_json::from_str(json).map_err(|source| ResolveError::Parse {
        name: name.to_string(),
        source,
    })?;
    let seasons = manifest
        .seasons
        .into_iter()
        .map(|s| {
            let episodes = order_season(&s.season_number, s.episodes);
            SeasonListing {
                season_number: s.season_number,
                episodes,
            }
        })
        .collect();
    Ok(TitleDetails::from_seasons(&manifest.title, seasons))
}

/// [`DetailsResolver`] for manifests given as `http(s)://` URL, `file://` URL or plain path.
#[derive(Debug, Clone)]
pub struct ManifestResolver {
    opts: FetchOptions,
}

impl ManifestResolver {
    pub fn new(cfg: &ResolverConfig) -> Self {
        Self {
            opts: FetchOptions {
                timeout: cfg.timeout(),
                user_agent: cfg.user_agent.clone(),
            },
        }
    }

    async fn read_source(&self, source: &str) -> Result<String, ResolveError> {
        let source = source.trim();
        if source.is_empty() {
            return Err(ResolveError::InvalidSource("empty source".to_string()));
        }
        if source.starts_with("http://") || source.starts_with("https://") {
            return tokio::task::spawn_blocking({
                let url = source.to_string();
                let opts = self.opts.clone();
                move || fetch::get_text(&url, &opts)
            })
            .await
            .map_err(|e| ResolveError::Task(e.to_string()))?;
        }
        let path = if source.starts_with("file://") {
            url::Url::parse(source)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| ResolveError::InvalidSource(source.to_string()))?
        } else {
            PathBuf::from(source)
        };
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ResolveError::Read { path, source })
    }
}

#[async_trait]
impl DetailsResolver for ManifestResolver {
    async fn resolve_details(&self, source: &str) -> Result<TitleDetails, ResolveError> {
        let text = self.read_source(source).await?;
        let details = parse_manifest(&text, source)?;
        tracing::debug!(
            source,
            title = %details.title,
            episodes = details.episodes.len(),
            "manifest resolved"
        );
        Ok(details)
    }
}
