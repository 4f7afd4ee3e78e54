//! Cluster backend client
//!
//! Wraps the cluster's job-execution contract: submitting a job object and
//! consuming the stream of job state changes. Events carry the object's
//! labels (including the `job_id` correlation label attached at submission)
//! and a monotonically increasing `resource_version` marker used to order
//! events without relying on wall-clock time.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, Result};
use gantry_core::domain::job::JobPhase;

/// HTTP client for the cluster job backend.
///
/// Regular calls carry a bounded timeout. The watch stream is deliberately
/// long-lived, so it is issued through a second client that only bounds the
/// connect; the reconciler detects a dead stream by it ending.
#[derive(Debug, Clone)]
pub struct ClusterClient {
    base_url: String,
    client: reqwest::Client,
    watch_client: reqwest::Client,
}

/// Snapshot pair returned by a successful job submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunJobResponse {
    /// Spec as accepted by the cluster (defaults filled in).
    pub spec: serde_json::Value,
    /// Status at acceptance time.
    pub status: serde_json::Value,
}

/// Observed state of a cluster job object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobState {
    pub name: String,
    #[serde(default)]
    pub labels: HashMap<String, String>,
    pub phase: JobPhase,
    pub resource_version: i64,
}

/// Kind of change a watch event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JobEventKind {
    Added,
    Modified,
    Deleted,
}

/// A single event from the job watch stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobEvent {
    #[serde(rename = "type")]
    pub kind: JobEventKind,
    pub job: JobState,
}

#[derive(Serialize)]
struct RunJobRequest<'a> {
    name: &'a str,
    labels: &'a HashMap<String, String>,
    spec: &'a serde_json::Value,
    metadata: &'a serde_json::Value,
}

impl ClusterClient {
    /// Create a new cluster client with a bounded per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into();
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let watch_client = reqwest::Client::builder().connect_timeout(timeout).build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            watch_client,
        })
    }

    /// Get the base URL of the cluster backend
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Submit a job object under `name` with the given labels and spec.
    ///
    /// Returns point-in-time spec and status snapshots, never a live view.
    pub async fn run_job(
        &self,
        name: &str,
        spec: &serde_json::Value,
        labels: &HashMap<String, String>,
        metadata: &serde_json::Value,
    ) -> Result<RunJobResponse> {
        let url = format!("{}/jobs", self.base_url);

        tracing::debug!("Submitting job object {}", name);

        let response = self
            .client
            .post(&url)
            .json(&RunJobRequest {
                name,
                labels,
                spec,
                metadata,
            })
            .send()
            .await?;

        crate::handle_response(response).await
    }

    /// List the current state of all job objects carrying `label`.
    ///
    /// Used for the full resync after a watch reconnect.
    pub async fn list_jobs(&self, label: &str) -> Result<Vec<JobState>> {
        let url = format!("{}/jobs", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("label", label)])
            .send()
            .await?;

        crate::handle_response(response).await
    }

    /// Open a watch stream for job objects carrying `label`, starting after
    /// the given version marker.
    pub async fn watch_jobs(&self, label: &str, after_version: i64) -> Result<JobWatch> {
        let url = format!("{}/jobs/watch", self.base_url);

        tracing::debug!(
            "Opening job watch for label '{}' after version {}",
            label,
            after_version
        );

        let response = self
            .watch_client
            .get(&url)
            .query(&[
                ("label", label.to_string()),
                ("after", after_version.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(JobWatch {
            response,
            buffer: Vec::new(),
        })
    }
}

/// An open watch stream of newline-delimited JSON job events.
pub struct JobWatch {
    response: reqwest::Response,
    buffer: Vec<u8>,
}

impl JobWatch {
    /// Read the next event, or `None` when the server closes the stream.
    pub async fn next_event(&mut self) -> Result<Option<JobEvent>> {
        loop {
            if let Some(pos) = self.buffer.iter().position(|b| *b == b'\n') {
                let line: Vec<u8> = self.buffer.drain(..=pos).collect();
                let line = &line[..line.len() - 1];

                if line.is_empty() {
                    continue;
                }

                return decode_event(line).map(Some);
            }

            match self.response.chunk().await? {
                Some(bytes) => self.buffer.extend_from_slice(&bytes),
                None => {
                    tracing::debug!("Job watch stream ended");
                    return Ok(None);
                }
            }
        }
    }
}

fn decode_event(line: &[u8]) -> Result<JobEvent> {
    serde_json::from_slice(line)
        .map_err(|e| ClientError::ParseError(format!("Failed to parse watch event: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_event() {
        let line = br#"{"type":"MODIFIED","job":{"name":"build-a1b2c3d4e5","labels":{"job_id":"0193e2a8-0000-7000-8000-000000000000","invoked":""},"phase":"Running","resource_version":42}}"#;

        let event = decode_event(line).unwrap();
        assert_eq!(event.kind, JobEventKind::Modified);
        assert_eq!(event.job.name, "build-a1b2c3d4e5");
        assert_eq!(event.job.phase, JobPhase::Running);
        assert_eq!(event.job.resource_version, 42);
        assert!(event.job.labels.contains_key("job_id"));
    }

    #[test]
    fn test_decode_event_missing_labels_defaults_empty() {
        let line = br#"{"type":"DELETED","job":{"name":"x","phase":"Unknown","resource_version":7}}"#;

        let event = decode_event(line).unwrap();
        assert_eq!(event.kind, JobEventKind::Deleted);
        assert!(event.job.labels.is_empty());
    }

    #[test]
    fn test_decode_event_rejects_garbage() {
        assert!(decode_event(b"not json").is_err());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = ClusterClient::new("http://localhost:7070/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:7070");
    }
}
