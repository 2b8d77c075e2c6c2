//! `episodl download <source>` – run one job in-process and report it.

use anyhow::{bail, Result};
use episodl_core::config::EpisodlConfig;
use episodl_core::job::{snapshot, JobRunner, JobStatus};
use std::time::Duration;

use super::report;

const PROGRESS_INTERVAL_MS: u64 = 500;

pub async fn run_download(cfg: &EpisodlConfig, source: &str) -> Result<()> {
    let runner = JobRunner::from_config(cfg);
    let id = runner.submit(source);
    println!("Job {} submitted for {}", id, source);

    let mut ticker = tokio::time::interval(Duration::from_millis(PROGRESS_INTERVAL_MS));
    let mut last_line = String::new();
    let job = loop {
        ticker.tick().await;
        let job = runner.get(id)?;
        let line = report::progress_line(&job);
        if line != last_line {
            println!("{}", line);
            last_line = line;
        }
        if job.is_terminal() {
            break job;
        }
    };

    println!();
    report::print_summary(&job);
    report::print_results(&job);
    if let Some(dir) = runner.settings().snapshot_dir.as_deref() {
        if job.status == JobStatus::Completed {
            println!("Snapshot: {}", snapshot::snapshot_path(dir, id).display());
        }
    }

    if job.status == JobStatus::Failed {
        bail!(
            "job {} failed: {}",
            id,
            job.error_message.as_deref().unwrap_or("unknown error")
        );
    }
    tracing::info!(job = %id, "download command finished");
    Ok(())
}
