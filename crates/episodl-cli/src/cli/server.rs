//! HTTP surface over a [`JobRunner`]: list a title, start a job, poll its state.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use episodl_core::episode::TitleDetails;
use episodl_core::job::{JobId, JobRunner, JobState};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct DownloadRequest {
    pub source_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DownloadAccepted {
    pub job_id: JobId,
    pub message: String,
}

/// Unknown or malformed job id.
#[derive(Debug)]
pub struct JobNotFound;

impl IntoResponse for JobNotFound {
    fn into_response(self) -> Response {
        (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "detail": "Job not found" })),
        )
            .into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct DetailsQuery {
    pub url: String,
}

/// Details resolution failed; reported as 500 with the resolver message.
#[derive(Debug)]
pub struct DetailsFailed(String);

impl IntoResponse for DetailsFailed {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "detail": self.0 })),
        )
            .into_response()
    }
}

pub fn router(runner: JobRunner) -> Router {
    Router::new()
        .route("/details", get(title_details))
        .route("/download-all", post(download_all))
        .route("/status/{job_id}", get(job_status))
        .with_state(runner)
}

async fn title_details(
    State(runner): State<JobRunner>,
    Query(q): Query<DetailsQuery>,
) -> Result<Json<TitleDetails>, DetailsFailed> {
    runner.details(&q.url).await.map(Json).map_err(|e| {
        tracing::warn!(source = %q.url, "details lookup failed: {}", e);
        DetailsFailed(e.to_string())
    })
}

async fn download_all(
    State(runner): State<JobRunner>,
    Json(req): Json<DownloadRequest>,
) -> Json<DownloadAccepted> {
    let job_id = runner.submit(&req.source_url);
    Json(DownloadAccepted {
        job_id,
        message: format!(
            "Download started in background. Check status with /status/{}",
            job_id
        ),
    })
}

async fn job_status(
    State(runner): State<JobRunner>,
    Path(job_id): Path<String>,
) -> Result<Json<JobState>, JobNotFound> {
    let id: JobId = job_id.parse().map_err(|_| JobNotFound)?;
    runner.get(id).map(Json).map_err(|_| JobNotFound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use episodl_core::config::EpisodlConfig;
    use episodl_core::job::JobStatus;

    fn runner(dir: &std::path::Path) -> JobRunner {
        JobRunner::from_config(&EpisodlConfig {
            storage_root: dir.join("data"),
            snapshot_dir: dir.to_path_buf(),
            ..EpisodlConfig::default()
        })
    }

    #[tokio::test]
    async fn download_all_returns_job_id_then_status_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(dir.path());
        let missing = dir.path().join("missing.json");

        let Json(accepted) = download_all(
            State(runner.clone()),
            Json(DownloadRequest {
                source_url: missing.display().to_string(),
            }),
        )
        .await;
        assert!(accepted.message.contains(&accepted.job_id.to_string()));

        let Ok(Json(job)) =
            job_status(State(runner.clone()), Path(accepted.job_id.to_string())).await
        else {
            panic!("job should exist right after submission");
        };
        assert_eq!(job.id, accepted.job_id);

        let done = runner.registry().wait_terminal(accepted.job_id).await.unwrap();
        assert_eq!(done.status, JobStatus::Failed);
        assert!(done.error_message.is_some());
    }

    #[tokio::test]
    async fn details_lists_episodes_without_starting_a_job() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(dir.path());
        let manifest = dir.path().join("show.json");
        std::fs::write(
            &manifest,
            r#"{"title": "Show", "seasons": [{"season_number": "1", "episodes": [
                {"number": "2", "url": "https://example.com/e2"},
                {"number": "1", "url": "https://example.com/e1"}]}]}"#,
        )
        .unwrap();

        let Ok(Json(details)) = title_details(
            State(runner.clone()),
            Query(DetailsQuery {
                url: manifest.display().to_string(),
            }),
        )
        .await
        else {
            panic!("manifest should resolve");
        };
        assert_eq!(details.title, "Show");
        let numbers: Vec<&str> = details.episodes.iter().map(|e| e.number.as_str()).collect();
        assert_eq!(numbers, ["1", "2"]);
        assert!(runner.registry().is_empty());
    }

    #[tokio::test]
    async fn details_failure_is_500_with_detail() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(dir.path());

        let Err(err) = title_details(
            State(runner),
            Query(DetailsQuery {
                url: dir.path().join("missing.json").display().to_string(),
            }),
        )
        .await
        else {
            panic!("missing manifest should fail");
        };
        assert!(err.0.contains("missing.json"));
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn unknown_or_malformed_id_is_404() {
        let dir = tempfile::tempdir().unwrap();
        let runner = runner(dir.path());

        for id in [JobId::new_v4().to_string(), "not-a-uuid".to_string()] {
            let Err(err) = job_status(State(runner.clone()), Path(id)).await else {
                panic!("expected not found");
            };
            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::NOT_FOUND);
        }
    }
}
