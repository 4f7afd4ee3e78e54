//! Job DTOs

use serde::{Deserialize, Serialize};

/// Request to submit a new job for an application.
///
/// `name` is the requested name; the coordinator appends a random suffix to
/// form the unique cluster object name. `spec` and `metadata` are passed
/// through to the cluster backend untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitJob {
    pub name: String,
    pub spec: serde_json::Value,
    #[serde(default)]
    pub metadata: serde_json::Value,
}
