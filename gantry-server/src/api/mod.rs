//! API Module
//!
//! HTTP boundary for the coordinator. Each submodule handles endpoints for
//! a specific domain; the shared state composes the store pool and the
//! process-scoped upstream clients for the handlers.

pub mod application;
pub mod error;
pub mod health;
pub mod job;
pub mod repo;
pub mod settings;

use std::path::PathBuf;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use gantry_client::{ClusterClient, RepoSyncClient};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Shared handler state: the store pool and the upstream clients, all safe
/// for concurrent use and reused across requests.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub sync: RepoSyncClient,
    pub cluster: ClusterClient,
    pub logs_path: PathBuf,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Repo endpoints
        .route("/repos", get(repo::list_repos))
        .route("/repos", post(repo::create_repo))
        .route("/repos/{id}", get(repo::get_repo))
        .route("/repos/{id}", put(repo::update_repo))
        .route("/repos/{id}", delete(repo::delete_repo))
        .route("/repos/{id}/sync", post(repo::sync_repo))
        // Application endpoints
        .route("/applications", get(application::list_applications))
        .route("/applications", post(application::create_application))
        .route("/applications/{id}", get(application::get_application))
        .route("/applications/{id}", put(application::update_application))
        .route("/applications/{id}", delete(application::delete_application))
        .route("/applications/{id}/jobs", get(job::list_application_jobs))
        .route("/applications/{id}/jobs", post(job::submit_job))
        // Job endpoints
        .route("/jobs/{id}", get(job::get_job))
        .route("/jobs/{id}", delete(job::delete_job))
        .route("/jobs/{id}/logs", get(job::get_job_logs))
        // Settings
        .route("/settings", get(settings::get_settings))
        // Add state and middleware
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
