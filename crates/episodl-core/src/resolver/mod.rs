//! Resolver interfaces for turning higher-level inputs into direct URLs.
//!
//! The pipeline only depends on these traits. It does not know how a title
//! listing or a media URL is discovered; the bundled implementations are
//! generic (JSON manifests, page scanning) and contain no site heuristics.

mod fetch;
mod manifest;
mod page_scan;

pub use manifest::{parse_manifest, ManifestResolver};
pub use page_scan::{find_media_url, looks_like_media, PageScanResolver};

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::episode::TitleDetails;

/// Failure of a details or media resolver.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: curl::Error,
    },
    #[error("timed out after {secs}s waiting for {url}")]
    Timeout { url: String, secs: u64 },
    #[error("GET {url} returned HTTP {code}")]
    Http { url: String, code: u32 },
    #[error("response from {url} exceeds {limit} bytes")]
    BodyTooLarge { url: String, limit: usize },
    #[error("read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse manifest {name}: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid source: {0}")]
    InvalidSource(String),
    #[error("resolver task failed: {0}")]
    Task(String),
}

/// Turns a title source (URL, path, ...) into a title name and ordered episodes.
#[async_trait]
pub trait DetailsResolver: Send + Sync {
    async fn resolve_details(&self, source: &str) -> Result<TitleDetails, ResolveError>;
}

/// Turns an episode page locator into a direct media URL.
///
/// `Ok(None)` means the page was inspected and held nothing playable.
/// Implementations must bound their own wait and fail instead of hanging.
#[async_trait]
pub trait MediaResolver: Send + Sync {
    async fn resolve_media(&self, page_url: &str) -> Result<Option<String>, ResolveError>;
}
