//! Repo DTOs

use serde::{Deserialize, Serialize};

/// Request to register a new repo.
///
/// The private key, when present, is forwarded to the sync service and never
/// stored locally.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepo {
    pub url: String,
    #[serde(default)]
    pub ssh_private_key: Option<String>,
}

/// Request to update an existing repo.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRepo {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub ssh_private_key: Option<String>,
}
