//! Repo Coordinator
//!
//! Repo CRUD, credential forwarding and sync orchestration. SSH keys are
//! delegated to the sync service and never stored locally.

use gantry_client::{ClientError, RepoSyncClient};
use gantry_core::domain::repo::Repo;
use gantry_core::dto::repo::{CreateRepo, UpdateRepo};
use sqlx::PgPool;
use uuid::Uuid;

use crate::repository::repo_repository;

/// Service error type
#[derive(Debug)]
pub enum RepoError {
    NotFound(Uuid),
    ValidationError(String),
    Upstream(ClientError),
    DatabaseError(sqlx::Error),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        RepoError::DatabaseError(err)
    }
}

impl From<ClientError> for RepoError {
    fn from(err: ClientError) -> Self {
        RepoError::Upstream(err)
    }
}

/// List all registered repos in creation order
pub async fn list_repos(pool: &PgPool) -> Result<Vec<Repo>, RepoError> {
    let repos = repo_repository::list(pool).await?;
    Ok(repos)
}

/// Get a repo by ID
pub async fn get_repo(pool: &PgPool, id: Uuid) -> Result<Repo, RepoError> {
    let repo = repo_repository::find_by_id(pool, id)
        .await?
        .ok_or(RepoError::NotFound(id))?;

    Ok(repo)
}

/// Register a new repo.
///
/// The record is created with empty commit/hash; the sync service is only
/// contacted when the request carries a private key to forward.
pub async fn create_repo(
    pool: &PgPool,
    sync: &RepoSyncClient,
    req: CreateRepo,
) -> Result<Repo, RepoError> {
    if req.url.is_empty() {
        return Err(RepoError::ValidationError("url cannot be empty".to_string()));
    }

    let repo = repo_repository::create(pool, &req.url).await?;

    tracing::info!("Repo created: {} ({})", repo.id, repo.url);

    if let Some(key) = &req.ssh_private_key {
        sync.save_ssh_key(repo.id, key).await?;
    }

    Ok(repo)
}

/// Forward an SSH credential for the repo to the sync service. Idempotent:
/// re-saving the same key replaces it in place.
pub async fn set_credential(
    pool: &PgPool,
    sync: &RepoSyncClient,
    id: Uuid,
    key: &str,
) -> Result<(), RepoError> {
    let repo = get_repo(pool, id).await?;
    sync.save_ssh_key(repo.id, key).await?;

    tracing::info!("Credential updated for repo {}", repo.id);

    Ok(())
}

/// Update a repo's URL and/or credential
pub async fn update_repo(
    pool: &PgPool,
    sync: &RepoSyncClient,
    id: Uuid,
    req: UpdateRepo,
) -> Result<Repo, RepoError> {
    let repo = get_repo(pool, id).await?;

    if let Some(url) = &req.url {
        if url.is_empty() {
            return Err(RepoError::ValidationError("url cannot be empty".to_string()));
        }
        repo_repository::update_url(pool, repo.id, url).await?;
    }

    if let Some(key) = &req.ssh_private_key {
        set_credential(pool, sync, repo.id, key).await?;
    }

    get_repo(pool, id).await
}

/// Sync the repo via the sync service.
///
/// On success the returned commit and hash are written together in a single
/// statement; on failure the stored state is left untouched. A partial
/// commit/hash write cannot happen.
pub async fn sync_repo(pool: &PgPool, sync: &RepoSyncClient, id: Uuid) -> Result<Repo, RepoError> {
    let repo = get_repo(pool, id).await?;

    let result = sync.sync(&repo.url, repo.id).await?;

    repo_repository::set_synced(pool, repo.id, &result.commit, &result.hash).await?;

    tracing::info!("Repo {} synced at commit {}", repo.id, result.commit);

    get_repo(pool, id).await
}

/// Delete a repo.
///
/// The remote credential is removed first; only then is the local record
/// soft-deleted. If the remote removal fails the record is kept and the
/// error surfaces, so the delete can be retried and a stale credential never
/// outlives its repo. A repo that never had a credential stored reports not
/// found on removal; that does not block the delete.
pub async fn delete_repo(pool: &PgPool, sync: &RepoSyncClient, id: Uuid) -> Result<(), RepoError> {
    let repo = get_repo(pool, id).await?;

    if let Err(e) = sync.remove_ssh_key(repo.id).await {
        if credential_removal_blocks_delete(&e) {
            return Err(e.into());
        }
        tracing::debug!("No credential stored for repo {}", repo.id);
    }

    repo_repository::soft_delete(pool, repo.id).await?;

    tracing::info!("Repo {} deleted", repo.id);

    Ok(())
}

/// Whether a failed credential removal must keep the repo record alive.
/// Only a missing credential is tolerated; everything else blocks the
/// delete so it can be retried.
fn credential_removal_blocks_delete(err: &ClientError) -> bool {
    !err.is_not_found()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_does_not_block_delete() {
        let err = ClientError::api_error(404, "no key for repo");
        assert!(!credential_removal_blocks_delete(&err));
    }

    #[test]
    fn test_failed_credential_removal_blocks_delete() {
        assert!(credential_removal_blocks_delete(&ClientError::api_error(
            500,
            "keystore unavailable"
        )));
        assert!(credential_removal_blocks_delete(&ClientError::ParseError(
            "bad body".to_string()
        )));
    }
}
