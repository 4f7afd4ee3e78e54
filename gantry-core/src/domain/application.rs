//! Application domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An application bound to a manifest path inside a registered repo.
///
/// `repo_id` must reference a live (non-deleted) [`Repo`](super::repo::Repo);
/// the coordinator enforces this on create and update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Application {
    pub id: Uuid,
    pub name: String,
    pub repo_id: Uuid,
    pub manifest_path: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
