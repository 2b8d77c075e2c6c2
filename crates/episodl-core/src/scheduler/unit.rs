//! Episode unit: resolve one page, then transfer its media.

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::episode::EpisodeRef;
use crate::layout;
use crate::outcome::OutcomeRecord;
use crate::resolver::MediaResolver;
use crate::transfer::Transferer;

/// Work executed by the scheduler for each episode. Must always produce a
/// record; failures are reported inside it.
#[async_trait]
pub trait EpisodeProcessor: Send + Sync + 'static {
    async fn process(&self, ep: &EpisodeRef) -> OutcomeRecord;
}

/// Resolve-then-download unit for one title.
pub struct EpisodeUnit {
    title: String,
    storage_root: PathBuf,
    resolver: Arc<dyn MediaResolver>,
    transferer: Arc<dyn Transferer>,
}

impl EpisodeUnit {
    pub fn new(
        title: impl Into<String>,
        storage_root: impl Into<PathBuf>,
        resolver: Arc<dyn MediaResolver>,
        transferer: Arc<dyn Transferer>,
    ) -> Self {
        Self {
            title: title.into(),
            storage_root: storage_root.into(),
            resolver,
            transferer,
        }
    }
}

#[async_trait]
impl EpisodeProcessor for EpisodeUnit {
    async fn process(&self, ep: &EpisodeRef) -> OutcomeRecord {
        // Single attempt; the resolver bounds its own wait.
        let media_url = match self.resolver.resolve_media(&ep.page_url).await {
            Ok(Some(url)) => url,
            Ok(None) => {
                tracing::info!(season = %ep.season, episode = %ep.number, "no media url found");
                return OutcomeRecord::not_found(ep);
            }
            Err(e) => {
                tracing::warn!(season = %ep.season, episode = %ep.number, "resolve failed: {}", e);
                return OutcomeRecord::error(ep, e.to_string());
            }
        };

        let dest = layout::episode_destination(&self.storage_root, &self.title, ep);
        tracing::info!("downloading {}", dest.filename);
        let transfer_error = match self.transferer.transfer(&media_url, &dest.path).await {
            Ok(bytes) => {
                tracing::debug!(path = %dest.path.display(), bytes, "episode downloaded");
                None
            }
            Err(e) => {
                tracing::warn!(url = %media_url, "download failed: {}", e);
                Some(e.to_string())
            }
        };

        OutcomeRecord::transferred(
            ep,
            media_url,
            dest.path.to_string_lossy().into_owned(),
            dest.filename,
            transfer_error,
        )
    }
}
