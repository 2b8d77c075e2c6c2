//! On-disk layout for downloaded episodes.
//!
//! `<storage root>/<title>/Season <season>/<title> - S<season>E<number>.mp4`,
//! with every generated segment passed through [`strip_reserved`]. The storage
//! root is used as given.

mod sanitize;

pub use sanitize::{strip_reserved, RESERVED_CHARS};

use std::path::{Path, PathBuf};

use crate::episode::{EpisodeRef, UNKNOWN_TITLE};

/// Extension used for every downloaded episode.
pub const MEDIA_EXTENSION: &str = "mp4";

/// Where one episode is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EpisodeDestination {
    /// Sanitized file name (last path component).
    pub filename: String,
    /// Full path below the storage root.
    pub path: PathBuf,
}

/// Sanitizes a generated segment. A segment left empty, or made only of dots
/// (`.`, `..`), becomes [`UNKNOWN_TITLE`] so no directory level disappears or
/// climbs out of the storage root.
pub fn segment(raw: &str) -> String {
    let cleaned = strip_reserved(raw);
    if cleaned.trim().chars().all(|c| c == '.') {
        UNKNOWN_TITLE.to_string()
    } else {
        cleaned
    }
}

/// Computes the destination of `ep` for title `title` below `storage_root`.
pub fn episode_destination(storage_root: &Path, title: &str, ep: &EpisodeRef) -> EpisodeDestination {
    let filename = segment(&format!(
        "{} - S{}E{}.{}",
        title, ep.season, ep.number, MEDIA_EXTENSION
    ));
    let path = storage_root
        .join(segment(title))
        .join(segment(&format!("Season {}", ep.season)))
        .join(&filename);
    EpisodeDestination { filename, path }
}
