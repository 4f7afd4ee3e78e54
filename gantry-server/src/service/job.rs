//! Job Coordinator
//!
//! Job CRUD and submission to the cluster backend. The coordinator only
//! creates Pending jobs and captures the submission snapshot; every later
//! phase transition is driven by the cluster event reconciler.

use std::collections::HashMap;

use gantry_client::{ClientError, ClusterClient};
use gantry_core::domain::job::Job;
use gantry_core::dto::job::SubmitJob;
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{application_repository, is_unique_violation, job_repository};

/// Label carrying the persisted job id on the cluster object, used by the
/// event reconciler to correlate events back to a row. Correlation never
/// goes through the object name, so cluster-side renames are harmless.
pub const JOB_ID_LABEL: &str = "job_id";

/// Label marking objects launched through this coordinator.
pub const INVOKED_LABEL: &str = "invoked";

/// Number of random characters appended to the requested job name.
const NAME_SUFFIX_LEN: usize = 10;

/// Service error type
#[derive(Debug)]
pub enum JobError {
    NotFound(Uuid),
    ApplicationNotFound(Uuid),
    ValidationError(String),
    Conflict(String),
    Upstream(ClientError),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for JobError {
    fn from(err: sqlx::Error) -> Self {
        JobError::DatabaseError(err)
    }
}

impl From<ClientError> for JobError {
    fn from(err: ClientError) -> Self {
        JobError::Upstream(err)
    }
}

/// A submitted job together with the point-in-time snapshots the cluster
/// returned at acceptance. Never a live view.
#[derive(Debug, Clone, Serialize)]
pub struct JobSubmission {
    pub job: Job,
    pub spec: serde_json::Value,
    pub status: serde_json::Value,
}

/// Submit a new job for an application.
///
/// The Pending row is persisted before the cluster call. If the cluster
/// rejects the submission the row stays behind with no captured spec; that
/// window is accepted and the row remains visible and deletable. The call is
/// never retried automatically, to rule out double submission.
pub async fn submit_job(
    pool: &PgPool,
    cluster: &ClusterClient,
    application_id: Uuid,
    req: SubmitJob,
) -> Result<JobSubmission, JobError> {
    if req.name.is_empty() {
        return Err(JobError::ValidationError("job name cannot be empty".to_string()));
    }

    // Verify the application reference
    application_repository::find_by_id(pool, application_id)
        .await?
        .ok_or(JobError::ApplicationNotFound(application_id))?;

    let name = compose_object_name(&req.name);

    let job = match job_repository::create(pool, &name, application_id).await {
        Ok(job) => job,
        Err(e) if is_unique_violation(&e) => {
            return Err(JobError::Conflict(format!(
                "cluster object name {} already taken",
                name
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let mut labels = HashMap::new();
    labels.insert(INVOKED_LABEL.to_string(), String::new());
    labels.insert(JOB_ID_LABEL.to_string(), job.id.to_string());

    let resp = cluster
        .run_job(&name, &req.spec, &labels, &req.metadata)
        .await?;

    job_repository::set_snapshots(pool, job.id, &resp.spec, &req.metadata).await?;

    tracing::info!("Job {} submitted as {}", job.id, name);

    let job = job_repository::find_by_id(pool, job.id)
        .await?
        .ok_or(JobError::NotFound(job.id))?;

    Ok(JobSubmission {
        job,
        spec: resp.spec,
        status: resp.status,
    })
}

/// Get a job by ID
pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Job, JobError> {
    let job = job_repository::find_by_id(pool, id)
        .await?
        .ok_or(JobError::NotFound(id))?;

    Ok(job)
}

/// List jobs for an application
pub async fn list_jobs_by_application(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<Vec<Job>, JobError> {
    application_repository::find_by_id(pool, application_id)
        .await?
        .ok_or(JobError::ApplicationNotFound(application_id))?;

    let jobs = job_repository::find_by_application(pool, application_id).await?;
    Ok(jobs)
}

/// Delete a job record. The cluster object, running or not, is not
/// cancelled; only the local record goes away.
pub async fn delete_job(pool: &PgPool, id: Uuid) -> Result<(), JobError> {
    let job = get_job(pool, id).await?;

    job_repository::soft_delete(pool, job.id).await?;

    tracing::info!("Job {} deleted", job.id);

    Ok(())
}

/// Compose the unique cluster object name from the requested name.
fn compose_object_name(requested: &str) -> String {
    format!("{}-{}", requested, random_suffix())
}

/// Fixed-length random lowercase-alphanumeric suffix drawn from a v4 UUID.
fn random_suffix() -> String {
    let id = Uuid::new_v4().simple().to_string();
    id[..NAME_SUFFIX_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_suffix_is_fixed_length_alphanumeric() {
        let suffix = random_suffix();
        assert_eq!(suffix.len(), NAME_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_composed_names_are_unique_across_many_submissions() {
        let names: HashSet<String> = (0..10_000).map(|_| compose_object_name("deploy")).collect();
        assert_eq!(names.len(), 10_000);
    }

    #[test]
    fn test_composed_name_keeps_requested_prefix() {
        let name = compose_object_name("nightly-build");
        assert!(name.starts_with("nightly-build-"));
        assert_eq!(name.len(), "nightly-build-".len() + NAME_SUFFIX_LEN);
    }
}
