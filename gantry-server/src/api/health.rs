//! Health Check API Handler
//!
//! Liveness endpoint for the Gantry coordinator. Reports process liveness
//! only; the store and the upstream services are not probed.

use axum::{http::StatusCode, response::IntoResponse};

/// GET /health
/// Coordinator liveness check
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
