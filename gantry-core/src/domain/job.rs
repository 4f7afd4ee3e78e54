//! Job domain types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An ad-hoc execution job launched for an application.
///
/// `name` is the unique cluster object name (requested name plus a random
/// suffix). `spec` and `meta` are opaque snapshots captured at submission;
/// they are never a live view of the cluster object. `observed_version` is
/// the highest cluster version marker applied to `phase`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub name: String,
    pub application_id: Uuid,
    pub phase: JobPhase,
    pub observed_version: i64,
    pub spec: Option<serde_json::Value>,
    pub meta: Option<serde_json::Value>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// Job execution phase.
///
/// Transitions only move forward (Pending → Running → Succeeded/Failed),
/// except that any non-terminal phase may move to Unknown when the
/// reconciler loses track of the cluster object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobPhase {
    Pending,
    Running,
    Succeeded,
    Failed,
    Unknown,
}

impl JobPhase {
    /// Terminal phases expect no further transition absent resubmission.
    pub fn is_terminal(self) -> bool {
        matches!(self, JobPhase::Succeeded | JobPhase::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_phases() {
        assert!(JobPhase::Succeeded.is_terminal());
        assert!(JobPhase::Failed.is_terminal());
        assert!(!JobPhase::Pending.is_terminal());
        assert!(!JobPhase::Running.is_terminal());
        assert!(!JobPhase::Unknown.is_terminal());
    }
}
