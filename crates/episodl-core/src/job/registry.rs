//! In-memory job registry shared by job tasks and status readers.
//!
//! Every mutation runs under one write lock, so a reader sees either none or
//! all of a batch: `processed_count` and `results` always move together.
//! Entries are never evicted.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use thiserror::Error;
use tokio::sync::watch;

use super::state::{JobId, JobState, JobStateError};
use crate::outcome::OutcomeRecord;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("job {0} not found")]
    NotFound(JobId),
    #[error(transparent)]
    State(#[from] JobStateError),
}

/// Keyed store of [`JobState`]s.
#[derive(Debug)]
pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, JobState>>,
    /// Bumped after every successful mutation; lets callers wait without polling.
    changes: watch::Sender<u64>,
}

impl Default for JobRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl JobRegistry {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            jobs: RwLock::new(HashMap::new()),
            changes,
        }
    }

    /// Inserts a new `pending` job for `source_url` and returns its fresh id.
    pub fn create(&self, source_url: &str) -> JobId {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let mut id = JobId::new_v4();
        while jobs.contains_key(&id) {
            id = JobId::new_v4();
        }
        jobs.insert(id, JobState::new(id, source_url));
        drop(jobs);
        self.notify();
        id
    }

    /// Snapshot of one job.
    pub fn get(&self, id: JobId) -> Result<JobState, RegistryError> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        jobs.get(&id).cloned().ok_or(RegistryError::NotFound(id))
    }

    /// Snapshots of all jobs, oldest first.
    pub fn list(&self) -> Vec<JobState> {
        let jobs = self.jobs.read().unwrap_or_else(PoisonError::into_inner);
        let mut all: Vec<JobState> = jobs.values().cloned().collect();
        all.sort_by_key(|j| (j.created_at, j.id));
        all
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receiver that changes whenever any job changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    fn notify(&self) {
        self.changes.send_modify(|v| *v = v.wrapping_add(1));
    }

    /// Applies `f` to job `id` under the write lock and returns the updated snapshot.
    fn update<F>(&self, id: JobId, f: F) -> Result<JobState, RegistryError>
    where
        F: FnOnce(&mut JobState) -> Result<(), JobStateError>,
    {
        let mut jobs = self.jobs.write().unwrap_or_else(PoisonError::into_inner);
        let job = jobs.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        f(job)?;
        let snapshot = job.clone();
        drop(jobs);
        self.notify();
        Ok(snapshot)
    }

    pub fn begin(&self, id: JobId) -> Result<JobState, RegistryError> {
        self.update(id, JobState::begin)
    }

    pub fn set_details(
        &self,
        id: JobId,
        title: &str,
        total_episodes: usize,
    ) -> Result<JobState, RegistryError> {
        self.update(id, |j| j.set_details(title, total_episodes))
    }

    /// Appends a batch and advances `processed_count` in one step.
    pub fn append_batch(
        &self,
        id: JobId,
        records: Vec<OutcomeRecord>,
    ) -> Result<JobState, RegistryError> {
        self.update(id, |j| j.append_batch(records))
    }

    pub fn complete(&self, id: JobId) -> Result<JobState, RegistryError> {
        self.update(id, JobState::complete)
    }

    /// Completed copy of job `id`; the stored job is left untouched and no
    /// reader sees the change until [`JobRegistry::publish_completed`].
    pub fn stage_complete(&self, id: JobId) -> Result<JobState, RegistryError> {
        let mut job = self.get(id)?;
        job.complete()?;
        Ok(job)
    }

    /// Stores a copy built by [`JobRegistry::stage_complete`] and wakes waiters.
    /// Rejected if the job changed since it was staged.
    pub fn publish_completed(&self, finished: JobState) -> Result<JobState, RegistryError> {
        self.update(finished.id, |j| j.adopt_completed(finished))
    }

    pub fn fail(&self, id: JobId, message: impl Into<String>) -> Result<JobState, RegistryError> {
        let message = message.into();
        self.update(id, |j| j.fail(message))
    }

    /// Waits until job `id` is completed or failed and returns its final snapshot.
    pub async fn wait_terminal(&self, id: JobId) -> Result<JobState, RegistryError> {
        let mut rx = self.subscribe();
        loop {
            let job = self.get(id)?;
            if job.is_terminal() {
                return Ok(job);
            }
            // The sender lives as long as `self`, so this only errs if it was dropped.
            if rx.changed().await.is_err() {
                return self.get(id);
            }
        }
    }
}
