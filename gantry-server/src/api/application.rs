//! Application API Handlers
//!
//! HTTP endpoints for applications and their manifest resolution.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use gantry_core::domain::application::Application;
use gantry_core::domain::manifest::Manifest;
use gantry_core::dto::application::{CreateApplication, UpdateApplication};
use serde::Serialize;
use uuid::Uuid;

use crate::api::AppState;
use crate::api::error::ApiResult;
use crate::service::application_service;

/// An application with its rendered manifest set.
#[derive(Debug, Serialize)]
pub struct ApplicationManifests {
    pub app: Application,
    pub manifests: Vec<Manifest>,
}

/// GET /applications
/// List all applications
pub async fn list_applications(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Application>>> {
    tracing::debug!("Listing applications");

    let apps = application_service::list_applications(&state.pool).await?;
    Ok(Json(apps))
}

/// POST /applications
/// Create a new application
pub async fn create_application(
    State(state): State<AppState>,
    Json(req): Json<CreateApplication>,
) -> ApiResult<Json<Application>> {
    tracing::info!("Creating application: {}", req.name);

    let app = application_service::create_application(&state.pool, req).await?;
    Ok(Json(app))
}

/// GET /applications/{id}
/// Get an application with its manifests.
///
/// Manifest resolution is best-effort on this path: if the sync service is
/// unreachable the application is still returned with an empty manifest set
/// and the failure is only logged.
pub async fn get_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ApplicationManifests>> {
    tracing::debug!("Getting application: {}", id);

    let app = application_service::get_application(&state.pool, id).await?;

    let manifests = match application_service::resolve_manifests(&state.pool, &state.sync, &app)
        .await
    {
        Ok(manifests) => manifests,
        Err(e) => {
            tracing::warn!("Manifest resolution failed for application {}: {:?}", id, e);
            Vec::new()
        }
    };

    Ok(Json(ApplicationManifests { app, manifests }))
}

/// PUT /applications/{id}
/// Update an application and return it with a fresh manifest render.
///
/// Unlike GET, a failed render here is a hard error: the caller asked for
/// the updated state and must not receive a stale or empty stand-in.
pub async fn update_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateApplication>,
) -> ApiResult<Json<ApplicationManifests>> {
    tracing::info!("Updating application: {}", id);

    let app = application_service::update_application(&state.pool, id, req).await?;
    let manifests =
        application_service::resolve_manifests(&state.pool, &state.sync, &app).await?;

    Ok(Json(ApplicationManifests { app, manifests }))
}

/// DELETE /applications/{id}
/// Delete an application. The referenced repo stays.
pub async fn delete_application(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<StatusCode> {
    tracing::info!("Deleting application: {}", id);

    application_service::delete_application(&state.pool, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
