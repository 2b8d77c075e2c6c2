//! Per-job state and its lifecycle.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

use crate::outcome::OutcomeRecord;
use crate::scheduler::JobProgress;

/// Job identifier.
pub type JobId = uuid::Uuid;

/// Lifecycle of a job: `pending → processing → completed | failed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejected state mutation. The state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JobStateError {
    #[error("job {id} is {status} and can no longer change")]
    Terminal { id: JobId, status: JobStatus },
    #[error("job {id}: cannot {action} while {status}")]
    InvalidTransition {
        id: JobId,
        status: JobStatus,
        action: &'static str,
    },
}

/// Everything known about one job. Serialized as-is for status queries and snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobState {
    pub id: JobId,
    pub source_url: String,
    pub status: JobStatus,
    #[serde(default)]
    pub title_name: Option<String>,
    #[serde(default)]
    pub total_episodes: usize,
    /// Always equals `results.len()`.
    #[serde(default)]
    pub processed_count: usize,
    /// Append-only; batches in order, completion order within a batch.
    #[serde(default)]
    pub results: Vec<OutcomeRecord>,
    /// Set only when the whole job failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub(crate) fn unix_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl JobState {
    pub fn new(id: JobId, source_url: impl Into<String>) -> Self {
        let now = unix_timestamp();
        Self {
            id,
            source_url: source_url.into(),
            status: JobStatus::Pending,
            title_name: None,
            total_episodes: 0,
            processed_count: 0,
            results: Vec::new(),
            error_message: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    pub fn progress(&self) -> JobProgress {
        JobProgress {
            processed: self.processed_count,
            total: self.total_episodes,
        }
    }

    fn require(&self, expected: JobStatus, action: &'static str) -> Result<(), JobStateError> {
        if self.is_terminal() {
            return Err(JobStateError::Terminal {
                id: self.id,
                status: self.status,
            });
        }
        if self.status != expected {
            return Err(JobStateError::InvalidTransition {
                id: self.id,
                status: self.status,
                action,
            });
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = unix_timestamp();
    }

    /// `pending → processing`.
    pub fn begin(&mut self) -> Result<(), JobStateError> {
        self.require(JobStatus::Pending, "start")?;
        self.status = JobStatus::Processing;
        self.touch();
        Ok(())
    }

    /// Records the resolved title and episode count.
    pub fn set_details(&mut self, title: &str, total_episodes: usize) -> Result<(), JobStateError> {
        self.require(JobStatus::Processing, "set details")?;
        self.title_name = Some(title.to_string());
        self.total_episodes = total_episodes;
        self.touch();
        Ok(())
    }

    /// Appends one batch of records and advances the counter by the same amount.
    pub fn append_batch(&mut self, records: Vec<OutcomeRecord>) -> Result<(), JobStateError> {
        self.require(JobStatus::Processing, "append results")?;
        self.processed_count += records.len();
        self.results.extend(records);
        self.touch();
        Ok(())
    }

    /// `processing → completed`.
    pub fn complete(&mut self) -> Result<(), JobStateError> {
        self.require(JobStatus::Processing, "complete")?;
        self.status = JobStatus::Completed;
        self.touch();
        Ok(())
    }

    /// Replaces this `processing` job with `finished`, a completed copy of it
    /// built by [`JobState::complete`].
    pub(crate) fn adopt_completed(&mut self, finished: JobState) -> Result<(), JobStateError> {
        self.require(JobStatus::Processing, "publish completion")?;
        if finished.id != self.id
            || finished.status != JobStatus::Completed
            || finished.processed_count != self.processed_count
        {
            return Err(JobStateError::InvalidTransition {
                id: self.id,
                status: self.status,
                action: "publish completion",
            });
        }
        *self = finished;
        Ok(())
    }

    /// `processing → failed` with a job-level message.
    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), JobStateError> {
        self.require(JobStatus::Processing, "fail")?;
        let message = message.into();
        self.error_message = Some(if message.trim().is_empty() {
            "job failed".to_string()
        } else {
            message
        });
        self.status = JobStatus::Failed;
        self.touch();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::episode::EpisodeRef;

    fn job() -> JobState {
        JobState::new(uuid::Uuid::new_v4(), "https://example.com/titles/1")
    }

    fn records(n: usize) -> Vec<OutcomeRecord> {
        (0..n)
            .map(|i| OutcomeRecord::not_found(&EpisodeRef::new("1", i.to_string(), "p")))
            .collect()
    }

    #[test]
    fn happy_path_transitions() {
        let mut j = job();
        assert_eq!(j.status, JobStatus::Pending);
        j.begin().unwrap();
        j.set_details("Show", 3).unwrap();
        j.append_batch(records(2)).unwrap();
        assert_eq!(j.processed_count, 2);
        j.append_batch(records(1)).unwrap();
        assert_eq!(j.processed_count, j.results.len());
        j.complete().unwrap();
        assert_eq!(j.status, JobStatus::Completed);
        assert_eq!(j.progress(), JobProgress { processed: 3, total: 3 });
    }

    #[test]
    fn cannot_skip_processing() {
        let mut j = job();
        let before = j.clone();
        assert!(matches!(
            j.complete(),
            Err(JobStateError::InvalidTransition { status: JobStatus::Pending, .. })
        ));
        assert!(j.fail("nope").is_err());
        assert!(j.append_batch(records(1)).is_err());
        assert_eq!(j, before);
    }

    #[test]
    fn terminal_states_are_frozen() {
        let mut done = job();
        done.begin().unwrap();
        done.complete().unwrap();
        let frozen = done.clone();
        assert!(matches!(done.begin(), Err(JobStateError::Terminal { .. })));
        assert!(done.append_batch(records(1)).is_err());
        assert!(done.set_details("X", 9).is_err());
        assert!(done.fail("late").is_err());
        assert_eq!(done, frozen);

        let mut failed = job();
        failed.begin().unwrap();
        failed.fail("details unavailable").unwrap();
        assert!(failed.complete().is_err());
        assert_eq!(failed.error_message.as_deref(), Some("details unavailable"));
    }

    #[test]
    fn adopt_completed_requires_matching_copy() {
        let mut j = job();
        j.begin().unwrap();
        j.append_batch(records(2)).unwrap();

        let mut stale = j.clone();
        stale.complete().unwrap();
        j.append_batch(records(1)).unwrap();
        let before = j.clone();
        assert!(j.adopt_completed(stale).is_err());
        assert_eq!(j, before);

        let mut finished = j.clone();
        finished.complete().unwrap();
        j.adopt_completed(finished.clone()).unwrap();
        assert_eq!(j, finished);
        assert!(j.adopt_completed(finished).is_err());
    }

    #[test]
    fn status_json_is_snake_case() {
        let mut j = job();
        j.begin().unwrap();
        let v = serde_json::to_value(&j).unwrap();
        assert_eq!(v["status"], "processing");
        assert_eq!(v["processed_count"], 0);
        assert!(v.get("error_message").is_none());
    }
}
