//! Repo API Handlers
//!
//! HTTP endpoints for repo registration, credential management and sync.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use gantry_core::domain::repo::Repo;
use gantry_core::dto::repo::{CreateRepo, UpdateRepo};
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::repo_service;

/// GET /repos
/// List all registered repos
pub async fn list_repos(State(state): State<AppState>) -> ApiResult<Json<Vec<Repo>>> {
    tracing::debug!("Listing repos");

    let repos = repo_service::list_repos(&state.pool).await?;
    Ok(Json(repos))
}

/// POST /repos
/// Register a new repo, forwarding the SSH key when present
pub async fn create_repo(
    State(state): State<AppState>,
    Json(req): Json<CreateRepo>,
) -> ApiResult<Json<Repo>> {
    tracing::info!("Registering repo: {}", req.url);

    let repo = repo_service::create_repo(&state.pool, &state.sync, req).await?;
    Ok(Json(repo))
}

/// GET /repos/{id}
/// Get repo details by ID
pub async fn get_repo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Repo>> {
    tracing::debug!("Getting repo: {}", id);

    let repo = repo_service::get_repo(&state.pool, id).await?;
    Ok(Json(repo))
}

/// PUT /repos/{id}
/// Update a repo's URL and/or credential
pub async fn update_repo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRepo>,
) -> ApiResult<Json<Repo>> {
    tracing::info!("Updating repo: {}", id);

    let repo = repo_service::update_repo(&state.pool, &state.sync, id, req).await?;
    Ok(Json(repo))
}

/// POST /repos/{id}/sync
/// Sync the repo now and return it with the fresh commit/hash pair
pub async fn sync_repo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<Repo>> {
    tracing::info!("Syncing repo: {}", id);

    let repo = repo_service::sync_repo(&state.pool, &state.sync, id).await?;
    Ok(Json(repo))
}

/// DELETE /repos/{id}
/// Remove the remote credential, then delete the repo
pub async fn delete_repo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting repo: {}", id);

    repo_service::delete_repo(&state.pool, &state.sync, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
