//! Batch loop with a global concurrency gate.

use futures::FutureExt;
use std::any::Any;
use std::fmt::Display;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::config::EpisodlConfig;
use crate::episode::EpisodeRef;
use crate::outcome::OutcomeRecord;

use super::unit::EpisodeProcessor;

/// Concurrency ceiling and flush granularity for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    /// Units executing at once across the whole run.
    pub concurrency_limit: usize,
    /// Episodes per batch; results are flushed once per batch.
    pub batch_size: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            concurrency_limit: 1,
            batch_size: 5,
        }
    }
}

impl From<&EpisodlConfig> for SchedulerConfig {
    fn from(cfg: &EpisodlConfig) -> Self {
        Self {
            concurrency_limit: cfg.concurrency_limit,
            batch_size: cfg.batch_size,
        }
    }
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid scheduler config: {0}")]
    InvalidConfig(&'static str),
    #[error("episode task did not finish: {0}")]
    Join(String),
    #[error("could not record batch {batch}: {message}")]
    Flush { batch: usize, message: String },
}

/// Runs episode units in contiguous batches under a shared semaphore.
#[derive(Debug, Clone)]
pub struct BoundedScheduler {
    cfg: SchedulerConfig,
}

impl BoundedScheduler {
    pub fn new(cfg: SchedulerConfig) -> Result<Self, SchedulerError> {
        if cfg.concurrency_limit == 0 {
            return Err(SchedulerError::InvalidConfig("concurrency limit must be at least 1"));
        }
        if cfg.batch_size == 0 {
            return Err(SchedulerError::InvalidConfig("batch size must be at least 1"));
        }
        Ok(Self { cfg })
    }

    pub fn config(&self) -> SchedulerConfig {
        self.cfg
    }

    /// Processes `refs` and hands each finished batch to `on_batch`, in batch
    /// order. Within a batch, records are in completion order. Batch N+1 is not
    /// started before `on_batch` returned for batch N.
    ///
    /// Returns the number of episodes processed.
    pub async fn run<P, F, E>(
        &self,
        unit: Arc<P>,
        refs: &[EpisodeRef],
        mut on_batch: F,
    ) -> Result<usize, SchedulerError>
    where
        P: EpisodeProcessor + ?Sized,
        F: FnMut(Vec<OutcomeRecord>) -> Result<(), E>,
        E: Display,
    {
        let gate = Arc::new(Semaphore::new(self.cfg.concurrency_limit));
        let mut processed = 0usize;

        for (batch_index, batch) in refs.chunks(self.cfg.batch_size).enumerate() {
            let mut tasks = JoinSet::new();
            for ep in batch {
                let ep = ep.clone();
                let gate = Arc::clone(&gate);
                let unit = Arc::clone(&unit);
                tasks.spawn(async move {
                    let Ok(_permit) = gate.acquire_owned().await else {
                        return OutcomeRecord::error(&ep, "concurrency gate closed");
                    };
                    process_contained(unit.as_ref(), &ep).await
                });
            }

            let mut records = Vec::with_capacity(batch.len());
            while let Some(joined) = tasks.join_next().await {
                let record = joined.map_err(|e| SchedulerError::Join(e.to_string()))?;
                records.push(record);
            }

            processed += records.len();
            tracing::debug!(batch = batch_index, size = records.len(), processed, "batch finished");
            on_batch(records).map_err(|e| SchedulerError::Flush {
                batch: batch_index,
                message: e.to_string(),
            })?;
        }

        Ok(processed)
    }
}

/// Runs one unit; a panic inside it becomes an `error` record for that episode.
async fn process_contained<P>(unit: &P, ep: &EpisodeRef) -> OutcomeRecord
where
    P: EpisodeProcessor + ?Sized,
{
    match AssertUnwindSafe(unit.process(ep)).catch_unwind().await {
        Ok(record) => record,
        Err(payload) => {
            let msg = panic_message(payload.as_ref());
            tracing::error!(season = %ep.season, episode = %ep.number, "episode task panicked: {}", msg);
            OutcomeRecord::error(ep, format!("episode task panicked: {}", msg))
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
