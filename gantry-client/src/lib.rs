//! Gantry upstream clients
//!
//! Typed HTTP adapters for the two external services the coordinator talks
//! to: the repo-sync service (git mirroring, credential custody and manifest
//! rendering) and the cluster backend (job execution and the job event
//! stream).
//!
//! Both clients are meant to be constructed once at process startup and
//! reused for every call; the underlying connection pool is held open across
//! requests. Every request carries a bounded timeout (the watch stream only
//! bounds the connect).
//!
//! # Example
//!
//! ```no_run
//! use gantry_client::RepoSyncClient;
//! use std::time::Duration;
//! use uuid::Uuid;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), gantry_client::ClientError> {
//!     let sync = RepoSyncClient::new("http://localhost:9000", Duration::from_secs(30))?;
//!     let result = sync.sync("git@github.com:acme/deploys.git", Uuid::new_v4()).await?;
//!     println!("synced at commit {}", result.commit);
//!     Ok(())
//! }
//! ```

pub mod cluster;
pub mod error;
pub mod sync;

pub use cluster::{ClusterClient, JobEvent, JobEventKind, JobState, JobWatch, RunJobResponse};
pub use error::{ClientError, Result};
pub use sync::{RepoSyncClient, SyncPaths, SyncResult};

use serde::de::DeserializeOwned;

/// Check the status code and deserialize the JSON body, or surface the
/// upstream's error text.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

/// Check the status code of a response with no useful body.
async fn handle_empty_response(response: reqwest::Response) -> Result<()> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    Ok(())
}
