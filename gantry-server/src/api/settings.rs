//! Settings API Handler
//!
//! Exposes the sync service's filesystem roots to the boundary.

use axum::{Json, extract::State};
use serde::Serialize;

use crate::api::AppState;
use crate::api::error::{ApiError, ApiResult};

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub repo_root: String,
    pub ssh_root: String,
    pub private_key: String,
}

/// GET /settings
/// Fetch the sync service's configured paths
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Json<SettingsResponse>> {
    tracing::debug!("Getting settings");

    let paths = state.sync.paths().await.map_err(ApiError::Upstream)?;

    Ok(Json(SettingsResponse {
        repo_root: paths.repo_root,
        ssh_root: paths.ssh_root,
        private_key: paths.private_key,
    }))
}
