//! CLI for the episodl episode downloader.

mod commands;
mod server;

use anyhow::Result;
use clap::builder::RangedU64ValueParser;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use episodl_core::config::{self, EpisodlConfig};
use episodl_core::job::JobId;
use std::path::PathBuf;

use commands::{run_completions, run_download, run_serve, run_status};

/// Top-level CLI for the episodl episode downloader.
#[derive(Debug, Parser)]
#[command(name = "episodl")]
#[command(about = "episodl: resolve and download every episode of a title", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Resolve a title and download all of its episodes, showing progress.
    Download {
        /// Title source: manifest path, file:// URL or http(s):// URL.
        source: String,
        /// Maximum episodes processed at once (overrides config).
        #[arg(long, value_name = "N", value_parser = at_least_one())]
        concurrency: Option<usize>,
        /// Episodes recorded per progress step (overrides config).
        #[arg(long, value_name = "N", value_parser = at_least_one())]
        batch_size: Option<usize>,
        /// Root directory for downloaded media (overrides config).
        #[arg(long, value_name = "DIR")]
        storage_root: Option<PathBuf>,
        /// Directory for the finished job snapshot (overrides config).
        #[arg(long, value_name = "DIR")]
        snapshot_dir: Option<PathBuf>,
    },

    /// Show a finished job from its saved snapshot.
    Status {
        /// Job identifier (UUID).
        job_id: JobId,
        /// Directory holding `downloads_<id>.json` (overrides config).
        #[arg(long, value_name = "DIR")]
        snapshot_dir: Option<PathBuf>,
    },

    /// Serve the HTTP API (`GET /details`, `POST /download-all`, `GET /status/{job_id}`).
    Serve {
        /// Listen address, e.g. 127.0.0.1:8000 (overrides config).
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Print shell completions to stdout.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn at_least_one() -> RangedU64ValueParser<usize> {
    RangedU64ValueParser::<usize>::new().range(1..)
}

/// Config values a command line may override.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub concurrency: Option<usize>,
    pub batch_size: Option<usize>,
    pub storage_root: Option<PathBuf>,
    pub snapshot_dir: Option<PathBuf>,
    pub bind: Option<String>,
}

impl Overrides {
    pub fn apply(self, mut cfg: EpisodlConfig) -> EpisodlConfig {
        if let Some(n) = self.concurrency {
            cfg.concurrency_limit = n;
        }
        if let Some(n) = self.batch_size {
            cfg.batch_size = n;
        }
        if let Some(dir) = self.storage_root {
            cfg.storage_root = dir;
        }
        if let Some(dir) = self.snapshot_dir {
            cfg.snapshot_dir = dir;
        }
        if let Some(bind) = self.bind {
            cfg.bind = bind;
        }
        cfg
    }
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        if let CliCommand::Completions { shell } = cli.command {
            run_completions(shell, &mut Cli::command());
            return Ok(());
        }

        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Download {
                source,
                concurrency,
                batch_size,
                storage_root,
                snapshot_dir,
            } => {
                let cfg = Overrides {
                    concurrency,
                    batch_size,
                    storage_root,
                    snapshot_dir,
                    ..Overrides::default()
                }
                .apply(cfg);
                run_download(&cfg, &source).await?;
            }
            CliCommand::Status {
                job_id,
                snapshot_dir,
            } => {
                let cfg = Overrides {
                    snapshot_dir,
                    ..Overrides::default()
                }
                .apply(cfg);
                run_status(&cfg.snapshot_dir, job_id)?;
            }
            CliCommand::Serve { bind } => {
                let cfg = Overrides {
                    bind,
                    ..Overrides::default()
                }
                .apply(cfg);
                run_serve(&cfg).await?;
            }
            CliCommand::Completions { .. } => {}
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
