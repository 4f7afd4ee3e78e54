//! Cluster event reconciler
//!
//! Consumes the cluster backend's job event stream and drives recorded job
//! phases toward the observed cluster state. Events are correlated by the
//! `job_id` label attached at submission, never by object name. Delivery is
//! at-least-once and possibly out of order; ordering is resolved by the
//! cluster's version marker, never by wall-clock time.
//!
//! The loop is a state machine per watched collection:
//! Disconnected → Syncing (full listing reconciled against the store) →
//! Watching (event stream); any stream error drops back to Disconnected.

use std::collections::HashSet;
use std::time::Duration;

use gantry_client::{ClientError, ClusterClient, JobEvent, JobEventKind};
use gantry_core::domain::job::JobPhase;
use sqlx::PgPool;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::repository::job_repository;
use crate::service::job_service::{INVOKED_LABEL, JOB_ID_LABEL};

const RECONNECT_BACKOFF: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WatchState {
    Disconnected,
    Syncing,
    Watching,
}

#[derive(Debug)]
enum ReconcileError {
    Upstream(ClientError),
    Database(sqlx::Error),
}

impl From<ClientError> for ReconcileError {
    fn from(err: ClientError) -> Self {
        ReconcileError::Upstream(err)
    }
}

impl From<sqlx::Error> for ReconcileError {
    fn from(err: sqlx::Error) -> Self {
        ReconcileError::Database(err)
    }
}

/// Background loop propagating cluster job state into the store.
pub struct ClusterEventReconciler {
    pool: PgPool,
    cluster: ClusterClient,
}

impl ClusterEventReconciler {
    pub fn new(pool: PgPool, cluster: ClusterClient) -> Self {
        Self { pool, cluster }
    }

    /// Runs the watch loop forever, reconnecting with a full resync after
    /// every disconnect.
    pub async fn run(&self) {
        info!("Starting cluster event reconciler");

        let mut state = WatchState::Disconnected;

        loop {
            transition(&mut state, WatchState::Syncing);

            let last_version = match self.resync().await {
                Ok(version) => version,
                Err(e) => {
                    error!("Cluster resync failed: {:?}", e);
                    transition(&mut state, WatchState::Disconnected);
                    tokio::time::sleep(RECONNECT_BACKOFF).await;
                    continue;
                }
            };

            let mut watch = match self.cluster.watch_jobs(INVOKED_LABEL, last_version).await {
                Ok(watch) => watch,
                Err(e) => {
                    error!("Failed to open cluster watch: {:?}", e);
                    transition(&mut state, WatchState::Disconnected);
                    tokio::time::sleep(RECONNECT_BACKOFF).await;
                    continue;
                }
            };

            transition(&mut state, WatchState::Watching);
            info!("Watching cluster job events from version {}", last_version);

            loop {
                match watch.next_event().await {
                    Ok(Some(event)) => {
                        if let Err(e) = self.apply_event(&event).await {
                            error!("Failed to apply event for {}: {:?}", event.job.name, e);
                        }
                    }
                    Ok(None) => {
                        warn!("Cluster watch stream closed");
                        break;
                    }
                    Err(e) => {
                        error!("Cluster watch stream failed: {:?}", e);
                        break;
                    }
                }
            }

            transition(&mut state, WatchState::Disconnected);
            tokio::time::sleep(RECONNECT_BACKOFF).await;
        }
    }

    /// Full listing reconciled against the store.
    ///
    /// Every listed object is applied through the same guarded transition as
    /// a watch event, so replaying state the store already has is a no-op.
    /// Tracked non-terminal jobs the cluster no longer reports move to
    /// Unknown; terminal jobs are never touched. Returns the highest version
    /// marker seen, which the subsequent watch resumes from.
    async fn resync(&self) -> Result<i64, ReconcileError> {
        let observed = self.cluster.list_jobs(INVOKED_LABEL).await?;

        let mut max_version = 0;
        let mut seen = HashSet::new();

        for state in &observed {
            max_version = max_version.max(state.resource_version);

            let Some(job_id) = job_id_from_labels(&state.labels) else {
                continue;
            };

            seen.insert(job_id);
            self.apply_state(job_id, state.phase, state.resource_version)
                .await?;
        }

        let active = job_repository::list_active(&self.pool).await?;

        for job in active {
            if !seen.contains(&job.id) {
                warn!("Job {} ({}) lost from cluster, marking Unknown", job.id, job.name);
                job_repository::mark_unknown(&self.pool, job.id).await?;
            }
        }

        debug!(
            "Resync complete: {} cluster object(s), version {}",
            observed.len(),
            max_version
        );

        Ok(max_version)
    }

    async fn apply_event(&self, event: &JobEvent) -> Result<(), ReconcileError> {
        let Some(job_id) = job_id_from_labels(&event.job.labels) else {
            debug!("Ignoring event for unlabeled object {}", event.job.name);
            return Ok(());
        };

        match event.kind {
            JobEventKind::Deleted => {
                if job_repository::mark_unknown(&self.pool, job_id).await? {
                    warn!("Job {} deleted on cluster, marked Unknown", job_id);
                }
                Ok(())
            }
            JobEventKind::Added | JobEventKind::Modified => {
                self.apply_state(job_id, event.job.phase, event.job.resource_version)
                    .await
            }
        }
    }

    async fn apply_state(
        &self,
        job_id: Uuid,
        observed: JobPhase,
        observed_version: i64,
    ) -> Result<(), ReconcileError> {
        let Some(job) = job_repository::find_by_id(&self.pool, job_id).await? else {
            debug!("Ignoring event for untracked job {}", job_id);
            return Ok(());
        };

        if let Some(phase) = next_phase(job.phase, job.observed_version, observed, observed_version)
        {
            let updated =
                job_repository::update_phase(&self.pool, job_id, phase, observed_version).await?;

            if updated {
                info!(
                    "Job {} phase {:?} -> {:?} (version {})",
                    job_id, job.phase, phase, observed_version
                );
            }
        }

        Ok(())
    }
}

fn transition(state: &mut WatchState, next: WatchState) {
    debug!("Reconciler state: {:?} -> {:?}", state, next);
    *state = next;
}

/// Parse the job id label from a cluster object's labels.
fn job_id_from_labels(labels: &std::collections::HashMap<String, String>) -> Option<Uuid> {
    labels.get(JOB_ID_LABEL).and_then(|v| Uuid::parse_str(v).ok())
}

/// Decide the phase transition for an observed cluster state.
///
/// Terminal rows never change. An event with an older version marker than
/// what the store already applied never wins, and replaying the phase the
/// store already has is a no-op, which makes event application idempotent.
fn next_phase(
    current: JobPhase,
    current_version: i64,
    observed: JobPhase,
    observed_version: i64,
) -> Option<JobPhase> {
    if current.is_terminal() {
        return None;
    }

    if observed_version < current_version {
        return None;
    }

    if observed == current {
        return None;
    }

    Some(observed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_forward_transition_is_applied() {
        assert_eq!(
            next_phase(JobPhase::Pending, 1, JobPhase::Running, 2),
            Some(JobPhase::Running)
        );
        assert_eq!(
            next_phase(JobPhase::Running, 2, JobPhase::Succeeded, 3),
            Some(JobPhase::Succeeded)
        );
    }

    #[test]
    fn test_replaying_the_same_event_is_idempotent() {
        // First application moves the phase...
        assert_eq!(
            next_phase(JobPhase::Pending, 1, JobPhase::Running, 2),
            Some(JobPhase::Running)
        );
        // ...replaying it against the updated row changes nothing.
        assert_eq!(next_phase(JobPhase::Running, 2, JobPhase::Running, 2), None);
    }

    #[test]
    fn test_older_version_marker_never_regresses() {
        assert_eq!(next_phase(JobPhase::Running, 5, JobPhase::Pending, 3), None);
    }

    #[test]
    fn test_terminal_phases_never_change() {
        assert_eq!(next_phase(JobPhase::Succeeded, 5, JobPhase::Running, 9), None);
        assert_eq!(next_phase(JobPhase::Failed, 5, JobPhase::Unknown, 9), None);
        assert_eq!(next_phase(JobPhase::Succeeded, 5, JobPhase::Failed, 9), None);
    }

    #[test]
    fn test_loss_moves_any_non_terminal_phase_to_unknown() {
        assert_eq!(
            next_phase(JobPhase::Running, 3, JobPhase::Unknown, 4),
            Some(JobPhase::Unknown)
        );
        assert_eq!(
            next_phase(JobPhase::Pending, 0, JobPhase::Unknown, 1),
            Some(JobPhase::Unknown)
        );
    }

    #[test]
    fn test_recovery_from_unknown_is_allowed() {
        assert_eq!(
            next_phase(JobPhase::Unknown, 4, JobPhase::Running, 6),
            Some(JobPhase::Running)
        );
    }

    #[test]
    fn test_job_id_label_parsing() {
        let id = Uuid::new_v4();
        let mut labels = HashMap::new();
        labels.insert(JOB_ID_LABEL.to_string(), id.to_string());
        labels.insert(INVOKED_LABEL.to_string(), String::new());

        assert_eq!(job_id_from_labels(&labels), Some(id));

        labels.insert(JOB_ID_LABEL.to_string(), "not-a-uuid".to_string());
        assert_eq!(job_id_from_labels(&labels), None);

        assert_eq!(job_id_from_labels(&HashMap::new()), None);
    }
}
