//! `episodl serve` – run the HTTP API until Ctrl-C.

use anyhow::{Context, Result};
use episodl_core::config::EpisodlConfig;
use episodl_core::job::JobRunner;
use tokio::net::TcpListener;

use crate::cli::server;

pub async fn run_serve(cfg: &EpisodlConfig) -> Result<()> {
    let runner = JobRunner::from_config(cfg);
    let listener = TcpListener::bind(&cfg.bind)
        .await
        .with_context(|| format!("bind {}", cfg.bind))?;
    let addr = listener.local_addr().context("listener address")?;
    tracing::info!("serving API on {}", addr);
    println!("Listening on http://{}", addr);

    axum::serve(listener, server::router(runner))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
        .context("http server")?;
    Ok(())
}
