//! `episodl status <job-id>` – show a saved job snapshot.

use anyhow::{bail, Result};
use episodl_core::job::{snapshot, JobId};
use std::path::Path;

use super::report;

pub fn run_status(snapshot_dir: &Path, id: JobId) -> Result<()> {
    let Some(job) = snapshot::load(snapshot_dir, id)? else {
        bail!(
            "job {} not found (no {})",
            id,
            snapshot::snapshot_path(snapshot_dir, id).display()
        );
    };
    report::print_summary(&job);
    report::print_results(&job);
    Ok(())
}
