//! Job Repository
//!
//! Handles all database operations related to jobs. Phase updates carry
//! their transition guard into the SQL so that concurrent appliers (watch
//! events, resync) serialize on the row write.

use gantry_core::domain::job::{Job, JobPhase};
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new Pending job under the given cluster object name.
///
/// The name carries a UNIQUE constraint; a violation surfaces as a database
/// error the service maps to a conflict.
pub async fn create(pool: &PgPool, name: &str, application_id: Uuid) -> Result<Job, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO jobs (id, name, application_id, phase, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(application_id)
    .bind(phase_to_string(JobPhase::Pending))
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Job {
        id,
        name: name.to_string(),
        application_id,
        phase: JobPhase::Pending,
        observed_version: 0,
        spec: None,
        meta: None,
        created_at: now,
        updated_at: now,
    })
}

/// Find a live job by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Job>, sqlx::Error> {
    let row = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT id, name, application_id, phase, observed_version, spec, meta,
               created_at, updated_at
        FROM jobs
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// List live jobs for an application in creation order
pub async fn find_by_application(
    pool: &PgPool,
    application_id: Uuid,
) -> Result<Vec<Job>, sqlx::Error> {
    let rows = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT id, name, application_id, phase, observed_version, spec, meta,
               created_at, updated_at
        FROM jobs
        WHERE application_id = $1 AND deleted_at IS NULL
        ORDER BY created_at ASC
        "#,
    )
    .bind(application_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// List live jobs that have not reached a terminal phase.
///
/// Used by the event reconciler's full resync to find jobs the cluster no
/// longer reports.
pub async fn list_active(pool: &PgPool) -> Result<Vec<Job>, sqlx::Error> {
    let rows = sqlx::query_as::<_, JobRow>(
        r#"
        SELECT id, name, application_id, phase, observed_version, spec, meta,
               created_at, updated_at
        FROM jobs
        WHERE deleted_at IS NULL AND phase NOT IN ('Succeeded', 'Failed')
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Capture the spec/meta snapshots returned by the cluster at submission
pub async fn set_snapshots(
    pool: &PgPool,
    id: Uuid,
    spec: &serde_json::Value,
    meta: &serde_json::Value,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET spec = $2, meta = $3, updated_at = $4
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(spec)
    .bind(meta)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Apply an observed phase at a version marker.
///
/// The guard is enforced in the statement itself: terminal rows are never
/// rewritten and an older version marker never wins, regardless of what the
/// caller decided from a stale read. Returns whether a row was updated.
pub async fn update_phase(
    pool: &PgPool,
    id: Uuid,
    phase: JobPhase,
    observed_version: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET phase = $2, observed_version = GREATEST(observed_version, $3), updated_at = $4
        WHERE id = $1
          AND deleted_at IS NULL
          AND phase NOT IN ('Succeeded', 'Failed')
          AND observed_version <= $3
        "#,
    )
    .bind(id)
    .bind(phase_to_string(phase))
    .bind(observed_version)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Move a non-terminal job to Unknown without advancing the version marker.
///
/// Used when the reconciler loses track of the cluster object (a full resync
/// no longer lists it, or the watch reports it deleted).
pub async fn mark_unknown(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE jobs
        SET phase = $2, updated_at = $3
        WHERE id = $1
          AND deleted_at IS NULL
          AND phase NOT IN ('Succeeded', 'Failed')
        "#,
    )
    .bind(id)
    .bind(phase_to_string(JobPhase::Unknown))
    .bind(chrono::Utc::now())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Soft-delete a job. Does not touch the cluster object.
pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE jobs
        SET deleted_at = $2
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

// =============================================================================
// Helper Functions
// =============================================================================

fn phase_to_string(phase: JobPhase) -> &'static str {
    match phase {
        JobPhase::Pending => "Pending",
        JobPhase::Running => "Running",
        JobPhase::Succeeded => "Succeeded",
        JobPhase::Failed => "Failed",
        JobPhase::Unknown => "Unknown",
    }
}

fn string_to_phase(s: &str) -> JobPhase {
    match s {
        "Pending" => JobPhase::Pending,
        "Running" => JobPhase::Running,
        "Succeeded" => JobPhase::Succeeded,
        "Failed" => JobPhase::Failed,
        _ => JobPhase::Unknown,
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    name: String,
    application_id: Uuid,
    phase: String,
    observed_version: i64,
    spec: Option<serde_json::Value>,
    meta: Option<serde_json::Value>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<JobRow> for Job {
    fn from(row: JobRow) -> Self {
        Job {
            id: row.id,
            name: row.name,
            application_id: row.application_id,
            phase: string_to_phase(&row.phase),
            observed_version: row.observed_version,
            spec: row.spec,
            meta: row.meta,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_string_round_trip() {
        for phase in [
            JobPhase::Pending,
            JobPhase::Running,
            JobPhase::Succeeded,
            JobPhase::Failed,
            JobPhase::Unknown,
        ] {
            assert_eq!(string_to_phase(phase_to_string(phase)), phase);
        }
    }

    #[test]
    fn test_unrecognized_phase_maps_to_unknown() {
        assert_eq!(string_to_phase("Evicted"), JobPhase::Unknown);
    }
}
