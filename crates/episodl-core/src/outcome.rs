//! Outcome records: the per-episode result appended to a job.

use serde::{Deserialize, Serialize};

use crate::episode::EpisodeRef;

/// Message recorded when the resolver finds nothing for a page.
pub const MEDIA_NOT_FOUND: &str = "Video URL not found";

/// Terminal status of one episode unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeStatus {
    Downloaded,
    DownloadFailed,
    /// Resolver found no media URL.
    Failed,
    /// Resolver raised.
    Error,
}

impl OutcomeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OutcomeStatus::Downloaded => "downloaded",
            OutcomeStatus::DownloadFailed => "download_failed",
            OutcomeStatus::Failed => "failed",
            OutcomeStatus::Error => "error",
        }
    }

    pub fn is_success(self) -> bool {
        self == OutcomeStatus::Downloaded
    }
}

/// Result of processing one [`EpisodeRef`]. A `downloaded` record carries
/// `media_url` and `local_path`; every other status carries `error_message`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutcomeRecord {
    pub season: String,
    pub number: String,
    pub page_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub status: OutcomeStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl OutcomeRecord {
    fn bare(ep: &EpisodeRef, status: OutcomeStatus) -> Self {
        Self {
            season: ep.season.clone(),
            number: ep.number.clone(),
            page_url: ep.page_url.clone(),
            media_url: None,
            local_path: None,
            filename: None,
            status,
            error_message: None,
        }
    }

    /// Resolver raised for this episode.
    pub fn error(ep: &EpisodeRef, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(non_empty(message.into(), "unknown error")),
            ..Self::bare(ep, OutcomeStatus::Error)
        }
    }

    /// Resolver ran but found no media URL.
    pub fn not_found(ep: &EpisodeRef) -> Self {
        Self {
            error_message: Some(MEDIA_NOT_FOUND.to_string()),
            ..Self::bare(ep, OutcomeStatus::Failed)
        }
    }

    /// Transfer attempted. `transfer_error` is `None` on success.
    pub fn transferred(
        ep: &EpisodeRef,
        media_url: String,
        local_path: String,
        filename: String,
        transfer_error: Option<String>,
    ) -> Self {
        let status = if transfer_error.is_none() {
            OutcomeStatus::Downloaded
        } else {
            OutcomeStatus::DownloadFailed
        };
        Self {
            media_url: Some(media_url),
            local_path: Some(local_path),
            filename: Some(filename),
            error_message: transfer_error.map(|m| non_empty(m, "download failed")),
            ..Self::bare(ep, status)
        }
    }
}

fn non_empty(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}
