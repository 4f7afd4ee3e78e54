//! Application Coordinator
//!
//! Application CRUD and manifest resolution. Applications must reference a
//! live repo; the foreign key is validated on create and update.

use gantry_client::{ClientError, RepoSyncClient};
use gantry_core::domain::application::Application;
use gantry_core::domain::manifest::Manifest;
use gantry_core::dto::application::{CreateApplication, UpdateApplication};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::{application_repository, repo_repository};

/// Service error type
#[derive(Debug)]
pub enum ApplicationError {
    NotFound(Uuid),
    ValidationError(String),
    Upstream(ClientError),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for ApplicationError {
    fn from(err: sqlx::Error) -> Self {
        ApplicationError::DatabaseError(err)
    }
}

impl From<ClientError> for ApplicationError {
    fn from(err: ClientError) -> Self {
        ApplicationError::Upstream(err)
    }
}

/// List all applications in creation order
pub async fn list_applications(pool: &PgPool) -> Result<Vec<Application>, ApplicationError> {
    let apps = application_repository::list(pool).await?;
    Ok(apps)
}

/// Get an application by ID
pub async fn get_application(pool: &PgPool, id: Uuid) -> Result<Application, ApplicationError> {
    let app = application_repository::find_by_id(pool, id)
        .await?
        .ok_or(ApplicationError::NotFound(id))?;

    Ok(app)
}

/// Create a new application referencing a live repo
pub async fn create_application(
    pool: &PgPool,
    req: CreateApplication,
) -> Result<Application, ApplicationError> {
    validate_repo_reference(pool, req.repo_id).await?;

    let app = application_repository::create(pool, &req).await?;

    tracing::info!("Application created: {} ({})", app.id, app.name);

    Ok(app)
}

/// Replace an application's fields, re-validating the repo reference
pub async fn update_application(
    pool: &PgPool,
    id: Uuid,
    req: UpdateApplication,
) -> Result<Application, ApplicationError> {
    let app = get_application(pool, id).await?;

    validate_repo_reference(pool, req.repo_id).await?;

    application_repository::update(pool, app.id, &req).await?;

    get_application(pool, id).await
}

/// Delete an application. The referenced repo is not deleted.
pub async fn delete_application(pool: &PgPool, id: Uuid) -> Result<(), ApplicationError> {
    let app = get_application(pool, id).await?;

    application_repository::soft_delete(pool, app.id).await?;

    tracing::info!("Application {} deleted", app.id);

    Ok(())
}

/// Render the application's manifests through the sync service.
///
/// Resolves the repo's on-disk root, joins it with the application's
/// manifest path and asks the sync service for a fresh render. Upstream
/// failure is a hard error here; the GET boundary path degrades it to an
/// empty manifest set instead (see `api::application`).
pub async fn resolve_manifests(
    pool: &PgPool,
    sync: &RepoSyncClient,
    app: &Application,
) -> Result<Vec<Manifest>, ApplicationError> {
    let repo = repo_repository::find_by_id(pool, app.repo_id)
        .await?
        .ok_or_else(|| {
            ApplicationError::ValidationError(format!(
                "repo {} does not exist or is deleted",
                app.repo_id
            ))
        })?;

    let repo_dir = sync.repo_dir(&repo.url).await?;
    let full_path = full_manifest_path(&repo_dir, &app.manifest_path);

    let manifests = sync.manifests(&full_path).await?;

    Ok(manifests)
}

/// Join the repo checkout root with a manifest path.
fn full_manifest_path(repo_dir: &str, manifest_path: &str) -> String {
    let dir = repo_dir.trim_end_matches('/');
    let path = manifest_path.trim_start_matches('/').trim_end_matches('/');

    if path.is_empty() {
        dir.to_string()
    } else {
        format!("{}/{}", dir, path)
    }
}

async fn validate_repo_reference(pool: &PgPool, repo_id: Uuid) -> Result<(), ApplicationError> {
    repo_repository::find_by_id(pool, repo_id)
        .await?
        .ok_or_else(|| {
            ApplicationError::ValidationError(format!(
                "repo {} does not exist or is deleted",
                repo_id
            ))
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_manifest_path_joins_segments() {
        assert_eq!(
            full_manifest_path("/var/repos/acme", "k8s/"),
            "/var/repos/acme/k8s"
        );
        assert_eq!(
            full_manifest_path("/var/repos/acme/", "/k8s/prod"),
            "/var/repos/acme/k8s/prod"
        );
    }

    #[test]
    fn test_full_manifest_path_empty_manifest_path() {
        assert_eq!(full_manifest_path("/var/repos/acme", ""), "/var/repos/acme");
        assert_eq!(full_manifest_path("/var/repos/acme", "/"), "/var/repos/acme");
    }
}
