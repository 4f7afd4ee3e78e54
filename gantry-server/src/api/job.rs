//! Job API Handlers
//!
//! HTTP endpoints for job submission, lookup and log indexing.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use gantry_core::domain::job::Job;
use gantry_core::dto::job::SubmitJob;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};
use crate::service::job_service::{self, JobSubmission};
use crate::service::log_service::{self, LogFile};

/// GET /applications/{id}/jobs
/// List jobs launched for an application
pub async fn list_application_jobs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<Job>>> {
    tracing::debug!("Listing jobs for application: {}", id);

    let jobs = job_service::list_jobs_by_application(&state.pool, id).await?;
    Ok(Json(jobs))
}

/// POST /applications/{id}/jobs
/// Submit a new job for an application
pub async fn submit_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SubmitJob>,
) -> ApiResult<Json<JobSubmission>> {
    tracing::info!("Submitting job '{}' for application {}", req.name, id);

    let submission = job_service::submit_job(&state.pool, &state.cluster, id, req).await?;
    Ok(Json(submission))
}

/// GET /jobs/{id}
/// Get job details by ID
pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<Job>> {
    tracing::debug!("Getting job: {}", id);

    let job = job_service::get_job(&state.pool, id).await?;
    Ok(Json(job))
}

/// DELETE /jobs/{id}
/// Delete a job record (the cluster object is not cancelled)
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting job: {}", id);

    job_service::delete_job(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /jobs/{id}/logs
/// Index the job's log directory, ordered by file creation time
pub async fn get_job_logs(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Vec<LogFile>>> {
    tracing::debug!("Getting logs for job: {}", id);

    // Verify the job exists before touching the filesystem
    let job = job_service::get_job(&state.pool, id).await?;

    let files = log_service::collect_job_logs(&state.logs_path, job.id)
        .map_err(|e| ApiError::InternalError(format!("Failed to read job logs: {}", e)))?;

    Ok(Json(files))
}
