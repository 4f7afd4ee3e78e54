//! API Error Handling
//!
//! Unified error type and conversions for API responses. Every failure
//! surfaces as a structured JSON error with a standard status code, never a
//! partial success payload.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gantry_client::ClientError;

use crate::service::{
    application_service::ApplicationError, job_service::JobError, repo_service::RepoError,
};

/// API error type
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Upstream(ClientError),
    DatabaseError(sqlx::Error),
    InternalError(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ApiError::Upstream(err) => {
                tracing::error!("Upstream error: {}", err);
                (StatusCode::BAD_GATEWAY, err.to_string())
            }
            ApiError::DatabaseError(err) => {
                tracing::error!("Database error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            ApiError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        ApiError::DatabaseError(err)
    }
}

impl From<RepoError> for ApiError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(id) => ApiError::NotFound(format!("Repo {} not found", id)),
            RepoError::ValidationError(msg) => ApiError::BadRequest(msg),
            RepoError::Upstream(err) => ApiError::Upstream(err),
            RepoError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        match err {
            ApplicationError::NotFound(id) => {
                ApiError::NotFound(format!("Application {} not found", id))
            }
            ApplicationError::ValidationError(msg) => ApiError::BadRequest(msg),
            ApplicationError::Upstream(err) => ApiError::Upstream(err),
            ApplicationError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

impl From<JobError> for ApiError {
    fn from(err: JobError) -> Self {
        match err {
            JobError::NotFound(id) => ApiError::NotFound(format!("Job {} not found", id)),
            JobError::ApplicationNotFound(id) => {
                ApiError::NotFound(format!("Application {} not found", id))
            }
            JobError::ValidationError(msg) => ApiError::BadRequest(msg),
            JobError::Conflict(msg) => ApiError::Conflict(msg),
            JobError::Upstream(err) => ApiError::Upstream(err),
            JobError::DatabaseError(err) => ApiError::DatabaseError(err),
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
