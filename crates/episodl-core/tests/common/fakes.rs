//! In-process collaborators for pipeline tests.

use async_trait::async_trait;
use episodl_core::episode::{EpisodeRef, TitleDetails};
use episodl_core::job::JobRegistry;
use episodl_core::resolver::{DetailsResolver, MediaResolver, ResolveError};
use episodl_core::transfer::{TransferError, Transferer};
use std::path::Path;
use std::sync::{Arc, Mutex};

/// `n` episodes of season 1 with page URLs `p/1` .. `p/n`.
pub fn episodes(n: usize) -> Vec<EpisodeRef> {
    (1..=n)
        .map(|i| EpisodeRef::new("1", i.to_string(), format!("p/{i}")))
        .collect()
}

pub struct StaticDetails(pub TitleDetails);

impl StaticDetails {
    pub fn new(title: &str, n: usize) -> Self {
        Self(TitleDetails {
            title: title.to_string(),
            episodes: episodes(n),
        })
    }
}

#[async_trait]
impl DetailsResolver for StaticDetails {
    async fn resolve_details(&self, _source: &str) -> Result<TitleDetails, ResolveError> {
        Ok(self.0.clone())
    }
}

pub struct FailingDetails(pub &'static str);

#[async_trait]
impl DetailsResolver for FailingDetails {
    async fn resolve_details(&self, _source: &str) -> Result<TitleDetails, ResolveError> {
        Err(ResolveError::InvalidSource(self.0.to_string()))
    }
}

pub struct PanickingDetails;

#[async_trait]
impl DetailsResolver for PanickingDetails {
    async fn resolve_details(&self, source: &str) -> Result<TitleDetails, ResolveError> {
        panic!("details exploded for {source}")
    }
}

/// What [`ScriptedMedia`] does for a given page URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaReply {
    Found,
    NotFound,
    Raise,
    Panic,
}

/// Media resolver answering per page URL; unlisted pages resolve to
/// `<page>.mp4`. Records the job's `processed_count` at every call when
/// `observe` is set.
pub struct ScriptedMedia {
    replies: Vec<(String, MediaReply)>,
    default: MediaReply,
    observe: Option<Arc<JobRegistry>>,
    pub seen_counts: Mutex<Vec<usize>>,
}

impl ScriptedMedia {
    pub fn always(default: MediaReply) -> Self {
        Self {
            replies: Vec::new(),
            default,
            observe: None,
            seen_counts: Mutex::new(Vec::new()),
        }
    }

    pub fn with(mut self, page_url: &str, reply: MediaReply) -> Self {
        self.replies.push((page_url.to_string(), reply));
        self
    }

    pub fn observing(mut self, registry: Arc<JobRegistry>) -> Self {
        self.observe = Some(registry);
        self
    }
}

#[async_trait]
impl MediaResolver for ScriptedMedia {
    async fn resolve_media(&self, page_url: &str) -> Result<Option<String>, ResolveError> {
        if let Some(reg) = &self.observe {
            for job in reg.list() {
                assert_eq!(job.processed_count, job.results.len());
                self.seen_counts.lock().unwrap().push(job.processed_count);
            }
        }
        let reply = self
            .replies
            .iter()
            .find(|(p, _)| p == page_url)
            .map(|(_, r)| *r)
            .unwrap_or(self.default);
        match reply {
            MediaReply::Found => Ok(Some(format!("https://cdn.test/{page_url}.mp4"))),
            MediaReply::NotFound => Ok(None),
            MediaReply::Raise => Err(ResolveError::InvalidSource(format!("cannot scan {page_url}"))),
            MediaReply::Panic => panic!("resolver panicked on {page_url}"),
        }
    }
}

/// Writes a fixed body to the destination and remembers every URL it saw.
#[derive(Default)]
pub struct MemoryTransferer {
    pub urls: Mutex<Vec<String>>,
    pub fail_urls: Vec<String>,
}

impl MemoryTransferer {
    pub const BODY: &'static [u8] = b"not really an mp4";

    pub fn failing_on(url: &str) -> Self {
        Self {
            urls: Mutex::new(Vec::new()),
            fail_urls: vec![url.to_string()],
        }
    }
}

#[async_trait]
impl Transferer for MemoryTransferer {
    async fn transfer(&self, url: &str, dest: &Path) -> Result<u64, TransferError> {
        self.urls.lock().unwrap().push(url.to_string());
        if self.fail_urls.iter().any(|u| u == url) {
            return Err(TransferError::Http {
                url: url.to_string(),
                code: 503,
            });
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| TransferError::Storage(e.to_string()))?;
        }
        std::fs::write(dest, Self::BODY).map_err(|e| TransferError::Storage(e.to_string()))?;
        Ok(Self::BODY.len() as u64)
    }
}
