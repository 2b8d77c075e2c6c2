//! Job runner: submit a title source, then drive it to a terminal state in the
//! background.
//!
//! details → scheduler (episode units) → completed + snapshot. The spawned task
//! is the only writer for its job; readers go through the registry.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::EpisodlConfig;
use crate::episode::TitleDetails;
use crate::resolver::{
    DetailsResolver, ManifestResolver, MediaResolver, PageScanResolver, ResolveError,
};
use crate::scheduler::{panic_message, BoundedScheduler, EpisodeUnit, SchedulerConfig};
use crate::transfer::{CurlTransferer, Transferer};

use super::registry::{JobRegistry, RegistryError};
use super::snapshot;
use super::state::{JobId, JobState, JobStatus};

/// Where a runner writes and how it schedules.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub storage_root: PathBuf,
    /// `None` disables snapshot export.
    pub snapshot_dir: Option<PathBuf>,
    pub scheduler: SchedulerConfig,
}

impl From<&EpisodlConfig> for RunnerSettings {
    fn from(cfg: &EpisodlConfig) -> Self {
        Self {
            storage_root: cfg.storage_root.clone(),
            snapshot_dir: Some(cfg.snapshot_dir.clone()),
            scheduler: SchedulerConfig::from(cfg),
        }
    }
}

struct RunnerInner {
    registry: Arc<JobRegistry>,
    details: Arc<dyn DetailsResolver>,
    media: Arc<dyn MediaResolver>,
    transferer: Arc<dyn Transferer>,
    settings: RunnerSettings,
}

/// Cheap to clone; all clones share the registry and collaborators.
#[derive(Clone)]
pub struct JobRunner {
    inner: Arc<RunnerInner>,
}

impl JobRunner {
    pub fn new(
        registry: Arc<JobRegistry>,
        details: Arc<dyn DetailsResolver>,
        media: Arc<dyn MediaResolver>,
        transferer: Arc<dyn Transferer>,
        settings: RunnerSettings,
    ) -> Self {
        Self {
            inner: Arc::new(RunnerInner {
                registry,
                details,
                media,
                transferer,
                settings,
            }),
        }
    }

    /// Runner with the bundled collaborators (manifest details, page scan, curl transfer).
    pub fn from_config(cfg: &EpisodlConfig) -> Self {
        let resolver_cfg = cfg.resolver_or_default();
        Self::new(
            Arc::new(JobRegistry::new()),
            Arc::new(ManifestResolver::new(&resolver_cfg)),
            Arc::new(PageScanResolver::new(&resolver_cfg)),
            Arc::new(CurlTransferer::new(cfg.transfer_or_default())),
            RunnerSettings::from(cfg),
        )
    }

    pub fn registry(&self) -> &Arc<JobRegistry> {
        &self.inner.registry
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.inner.settings
    }

    /// Resolves `source` into its title and episodes without creating a job.
    pub async fn details(&self, source_url: &str) -> Result<TitleDetails, ResolveError> {
        self.inner.details.resolve_details(source_url).await
    }

    /// Snapshot lookup.
    pub fn get(&self, id: JobId) -> Result<JobState, RegistryError> {
        self.inner.registry.get(id)
    }

    /// Registers a `pending` job and starts it on a background task.
    /// Returns immediately; no resolution happens before this returns.
    /// Must be called from within a tokio runtime.
    pub fn submit(&self, source_url: &str) -> JobId {
        let id = self.inner.registry.create(source_url);
        tracing::info!(job = %id, source = source_url, "job submitted");
        let runner = self.clone();
        let source = source_url.to_string();
        tokio::spawn(async move {
            let outcome = AssertUnwindSafe(runner.run(id, &source)).catch_unwind().await;
            match outcome {
                Ok(Ok(status)) => tracing::debug!(job = %id, %status, "job task finished"),
                Ok(Err(e)) => tracing::error!(job = %id, "job task aborted: {}", e),
                Err(payload) => {
                    let msg = format!("job task panicked: {}", panic_message(payload.as_ref()));
                    tracing::error!(job = %id, "{}", msg);
                    if let Err(e) = runner.inner.registry.fail(id, msg) {
                        tracing::warn!(job = %id, "could not mark job failed: {}", e);
                    }
                }
            }
        });
        id
    }

    /// Submits and waits for the job to reach a terminal state.
    pub async fn submit_and_wait(&self, source_url: &str) -> Result<JobState, RegistryError> {
        let id = self.submit(source_url);
        self.inner.registry.wait_terminal(id).await
    }

    /// Drives job `id` from `pending` to `completed` or `failed`.
    ///
    /// Per-episode failures end up in the results; only a details failure or a
    /// scheduler error fails the job. Errors returned here mean the job itself
    /// could not be updated (unknown id, already started).
    pub async fn run(&self, id: JobId, source_url: &str) -> Result<JobStatus, RegistryError> {
        let inner = &self.inner;
        inner.registry.begin(id)?;
        tracing::info!(job = %id, source = source_url, "job processing");

        let details = match inner.details.resolve_details(source_url).await {
            Ok(d) => d,
            Err(e) => {
                tracing::warn!(job = %id, "details resolution failed: {}", e);
                inner.registry.fail(id, e.to_string())?;
                return Ok(JobStatus::Failed);
            }
        };
        inner
            .registry
            .set_details(id, &details.title, details.episodes.len())?;
        tracing::info!(
            job = %id,
            title = %details.title,
            episodes = details.episodes.len(),
            "details resolved"
        );

        let unit = Arc::new(EpisodeUnit::new(
            details.title.clone(),
            inner.settings.storage_root.clone(),
            Arc::clone(&inner.media),
            Arc::clone(&inner.transferer),
        ));
        let run = match BoundedScheduler::new(inner.settings.scheduler) {
            Ok(scheduler) => {
                scheduler
                    .run(unit, &details.episodes, |records| {
                        inner.registry.append_batch(id, records).map(|_| ())
                    })
                    .await
            }
            Err(e) => Err(e),
        };

        match run {
            Ok(processed) => {
                // The snapshot file exists before anyone can observe `completed`.
                let finished = inner.registry.stage_complete(id)?;
                self.export(&finished).await;
                inner.registry.publish_completed(finished)?;
                tracing::info!(job = %id, processed, "job completed");
                Ok(JobStatus::Completed)
            }
            Err(e) => {
                tracing::error!(job = %id, "job failed: {}", e);
                inner.registry.fail(id, e.to_string())?;
                Ok(JobStatus::Failed)
            }
        }
    }

    /// Writes the job snapshot on the blocking pool. Failures are only logged.
    async fn export(&self, job: &JobState) {
        let Some(dir) = self.inner.settings.snapshot_dir.clone() else {
            return;
        };
        let id = job.id;
        let saved = tokio::task::spawn_blocking({
            let job = job.clone();
            move || snapshot::save(&dir, &job)
        })
        .await;
        match saved {
            Ok(Ok(path)) => tracing::info!(job = %id, "snapshot written to {}", path.display()),
            Ok(Err(e)) => tracing::warn!(job = %id, "snapshot export failed: {:#}", e),
            Err(e) => tracing::warn!(job = %id, "snapshot task failed: {}", e),
        }
    }
}
