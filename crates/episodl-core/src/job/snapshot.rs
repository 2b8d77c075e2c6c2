//! Point-in-time JSON export of a finished job (`downloads_<id>.json`).

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::state::{JobId, JobState};

/// Snapshot file for job `id` inside `dir`.
pub fn snapshot_path(dir: &Path, id: JobId) -> PathBuf {
    dir.join(format!("downloads_{}.json", id))
}

/// Writes `job` as pretty JSON (creates `dir` if needed). Returns the file path.
pub fn save(dir: &Path, job: &JobState) -> Result<PathBuf> {
    std::fs::create_dir_all(dir).with_context(|| format!("create dir: {}", dir.display()))?;
    let path = snapshot_path(dir, job.id);
    let json = serde_json::to_string_pretty(job).context("serialize job snapshot")?;
    std::fs::write(&path, json)
        .with_context(|| format!("write job snapshot: {}", path.display()))?;
    Ok(path)
}

/// Reads the snapshot of job `id`; `None` if it was never written.
pub fn load(dir: &Path, id: JobId) -> Result<Option<JobState>> {
    let path = snapshot_path(dir, id);
    let bytes = match std::fs::read(&path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("read job snapshot: {}", path.display())),
    };
    let job: JobState = serde_json::from_slice(&bytes)
        .with_context(|| format!("parse job snapshot: {}", path.display()))?;
    Ok(Some(job))
}
