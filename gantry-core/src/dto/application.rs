//! Application DTOs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create a new application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateApplication {
    pub name: String,
    pub repo_id: Uuid,
    pub manifest_path: String,
}

/// Request to update an application. All fields are replaced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateApplication {
    pub name: String,
    pub repo_id: Uuid,
    pub manifest_path: String,
}
