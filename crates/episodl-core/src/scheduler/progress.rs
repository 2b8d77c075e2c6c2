//! Progress reporting for jobs (episodes processed out of total).
//!
//! Used by the CLI to print progress while a job runs.

use serde::Serialize;

/// Snapshot of how far a job got.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JobProgress {
    /// Episodes with an appended outcome record.
    pub processed: usize,
    /// Episodes enumerated for the job (0 until details resolve).
    pub total: usize,
}

impl JobProgress {
    /// Fraction complete in [0.0, 1.0]. A job with no episodes counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        (self.processed as f64 / self.total as f64).min(1.0)
    }

    pub fn remaining(&self) -> usize {
        self.total.saturating_sub(self.processed)
    }
}
