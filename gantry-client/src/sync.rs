//! Repo-sync service client
//!
//! Wraps the sync service's RPC contract: repository mirroring, SSH
//! credential custody and manifest rendering. SSH keys live entirely on the
//! sync service side, referenced by repo id; the coordinator never stores
//! them.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use gantry_core::domain::manifest::Manifest;

/// HTTP client for the repo-sync service.
#[derive(Debug, Clone)]
pub struct RepoSyncClient {
    /// Base URL of the sync service (e.g., "http://localhost:9000")
    base_url: String,
    /// HTTP client instance, reused across calls
    client: reqwest::Client,
}

/// Result of a successful repo sync: the commit the mirror landed on and the
/// content hash of the checkout. Always consumed as a pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    pub commit: String,
    pub hash: String,
}

/// Filesystem roots the sync service operates under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncPaths {
    pub repo_root: String,
    pub ssh_root: String,
    pub private_key: String,
}

#[derive(Serialize)]
struct SyncRequest<'a> {
    repo_url: &'a str,
    repo_id: Uuid,
}

#[derive(Serialize)]
struct SaveSshKeyRequest<'a> {
    repo_id: Uuid,
    ssh_key: &'a str,
}

#[derive(Serialize)]
struct RepoDirRequest<'a> {
    repo_url: &'a str,
}

#[derive(Deserialize)]
struct RepoDirResponse {
    path: String,
}

#[derive(Serialize)]
struct ManifestsRequest<'a> {
    path: &'a str,
}

#[derive(Deserialize)]
struct ManifestsResponse {
    manifests: Vec<Manifest>,
}

impl RepoSyncClient {
    /// Create a new sync-service client with a bounded per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(base_url, client))
    }

    /// Create a client from a preconfigured `reqwest::Client` (custom
    /// timeouts, proxies, TLS).
    pub fn with_client(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the sync service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Mirror the repository and return the commit/hash pair it landed on.
    pub async fn sync(&self, repo_url: &str, repo_id: Uuid) -> Result<SyncResult> {
        let url = format!("{}/sync", self.base_url);

        tracing::debug!("Requesting sync of {} ({})", repo_url, repo_id);

        let response = self
            .client
            .post(&url)
            .json(&SyncRequest { repo_url, repo_id })
            .send()
            .await?;

        crate::handle_response(response).await
    }

    /// Store an SSH private key for the repo on the sync service. Replaces
    /// any existing key for the same repo id.
    pub async fn save_ssh_key(&self, repo_id: Uuid, ssh_key: &str) -> Result<()> {
        let url = format!("{}/ssh-keys", self.base_url);

        // Log the repo id only, never key material
        tracing::debug!("Saving SSH key for repo {}", repo_id);

        let response = self
            .client
            .post(&url)
            .json(&SaveSshKeyRequest { repo_id, ssh_key })
            .send()
            .await?;

        crate::handle_empty_response(response).await
    }

    /// Remove the SSH private key stored for the repo, if any.
    pub async fn remove_ssh_key(&self, repo_id: Uuid) -> Result<()> {
        let url = format!("{}/ssh-keys/{}", self.base_url, repo_id);

        tracing::debug!("Removing SSH key for repo {}", repo_id);

        let response = self.client.delete(&url).send().await?;

        crate::handle_empty_response(response).await
    }

    /// Resolve the on-disk root of a mirrored repository.
    pub async fn repo_dir(&self, repo_url: &str) -> Result<String> {
        let url = format!("{}/repo-dir", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&RepoDirRequest { repo_url })
            .send()
            .await?;

        let resp: RepoDirResponse = crate::handle_response(response).await?;
        Ok(resp.path)
    }

    /// Render the manifests found under `path`.
    pub async fn manifests(&self, path: &str) -> Result<Vec<Manifest>> {
        let url = format!("{}/manifests", self.base_url);

        tracing::debug!("Rendering manifests under {}", path);

        let response = self
            .client
            .post(&url)
            .json(&ManifestsRequest { path })
            .send()
            .await?;

        let resp: ManifestsResponse = crate::handle_response(response).await?;
        Ok(resp.manifests)
    }

    /// Fetch the filesystem roots the sync service operates under.
    pub async fn paths(&self) -> Result<SyncPaths> {
        let url = format!("{}/paths", self.base_url);
        let response = self.client.get(&url).send().await?;

        crate::handle_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_trims_trailing_slash() {
        let client =
            RepoSyncClient::with_client("http://localhost:9000/", reqwest::Client::new());
        assert_eq!(client.base_url(), "http://localhost:9000");
    }

    #[test]
    fn test_client_creation_with_timeout() {
        let client = RepoSyncClient::new("http://localhost:9000", Duration::from_secs(5));
        assert!(client.is_ok());
    }
}
