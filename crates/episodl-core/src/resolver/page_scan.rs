//! Media resolver that scans an episode page for a playable URL.
//!
//! A URL counts as media when it contains `.mp4` or `.m3u8`. The page itself is
//! returned when it already is such a URL; otherwise the HTML is fetched and
//! the first quoted candidate wins, with a `<video src>` attribute as fallback.

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;

use crate::config::ResolverConfig;

use super::fetch::{self, FetchOptions};
use super::{MediaResolver, ResolveError};

const MEDIA_MARKERS: [&str; 2] = [".mp4", ".m3u8"];

/// True if `url` points at something the transferer can fetch directly.
pub fn looks_like_media(url: &str) -> bool {
    MEDIA_MARKERS.iter().any(|m| url.contains(m))
}

fn quoted_candidate_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"["']([^"'\s<>]*?\.(?:mp4|m3u8)(?:[?#][^"'\s<>]*)?)["']"#)
            .expect("static regex")
    })
}

fn video_src_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<video\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).expect("static regex")
    })
}

/// Makes `candidate` absolute against `page_url`; drops `blob:`/`data:` sources.
fn absolutize(page_url: &str, candidate: &str) -> Option<String> {
    let candidate = candidate.replace("\\/", "/");
    let candidate = candidate.trim();
    if candidate.is_empty() || candidate.starts_with("blob:") || candidate.starts_with("data:") {
        return None;
    }
    if let Ok(abs) = url::Url::parse(candidate) {
        return Some(abs.to_string());
    }
    let base = url::Url::parse(page_url).ok()?;
    base.join(candidate).ok().map(|u| u.to_string())
}

/// Finds the first media URL referenced by `body`, resolved against `page_url`.
pub fn find_media_url(page_url: &str, body: &str) -> Option<String> {
    let from_quotes = quoted_candidate_re()
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .find_map(|m| absolutize(page_url, m.as_str()));
    if from_quotes.is_some() {
        return from_quotes;
    }
    video_src_re()
        .captures_iter(body)
        .filter_map(|c| c.get(1))
        .find_map(|m| absolutize(page_url, m.as_str()))
}

/// [`MediaResolver`] backed by a single page fetch (curl) and a text scan.
#[derive(Debug, Clone)]
pub struct PageScanResolver {
    opts: FetchOptions,
}

impl PageScanResolver {
    pub fn new(cfg: &ResolverConfig) -> Self {
        Self {
            opts: FetchOptions {
                timeout: cfg.timeout(),
                user_agent: cfg.user_agent.clone(),
            },
        }
    }
}

#[async_trait]
impl MediaResolver for PageScanResolver {
    async fn resolve_media(&self, page_url: &str) -> Result<Option<String>, ResolveError> {
        if looks_like_media(page_url) {
            return Ok(Some(page_url.to_string()));
        }
        let body = tokio::task::spawn_blocking({
            let url = page_url.to_string();
            let opts = self.opts.clone();
            move || fetch::get_text(&url, &opts)
        })
        .await
        .map_err(|e| ResolveError::Task(e.to_string()))??;

        let found = find_media_url(page_url, &body);
        match &found {
            Some(media) => tracing::debug!(page = page_url, media = %media, "media candidate found"),
            None => tracing::debug!(page = page_url, "no media candidate on page"),
        }
        Ok(found)
    }
}
