//! Repo domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered git repository.
///
/// `commit` and `hash` describe the last successful sync and are only ever
/// updated together, from a sync-service response. Both are empty until the
/// first sync completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Repo {
    pub id: Uuid,
    pub url: String,
    pub commit: String,
    pub hash: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}
