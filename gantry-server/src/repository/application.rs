//! Application Repository
//!
//! Handles all database operations related to applications.

use gantry_core::domain::application::Application;
use gantry_core::dto::application::{CreateApplication, UpdateApplication};
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new application
pub async fn create(pool: &PgPool, req: &CreateApplication) -> Result<Application, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO applications (id, name, repo_id, manifest_path, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $5)
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(req.repo_id)
    .bind(&req.manifest_path)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Application {
        id,
        name: req.name.clone(),
        repo_id: req.repo_id,
        manifest_path: req.manifest_path.clone(),
        created_at: now,
        updated_at: now,
    })
}

/// List live applications in creation order
pub async fn list(pool: &PgPool) -> Result<Vec<Application>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ApplicationRow>(
        r#"
        SELECT id, name, repo_id, manifest_path, created_at, updated_at
        FROM applications
        WHERE deleted_at IS NULL
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Find a live application by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Application>, sqlx::Error> {
    let row = sqlx::query_as::<_, ApplicationRow>(
        r#"
        SELECT id, name, repo_id, manifest_path, created_at, updated_at
        FROM applications
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Replace the mutable fields of an application
pub async fn update(
    pool: &PgPool,
    id: Uuid,
    req: &UpdateApplication,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE applications
        SET name = $2, repo_id = $3, manifest_path = $4, updated_at = $5
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(&req.name)
    .bind(req.repo_id)
    .bind(&req.manifest_path)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Soft-delete an application. The referenced repo is untouched.
pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE applications
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
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct ApplicationRow {
    id: Uuid,
    name: String,
    repo_id: Uuid,
    manifest_path: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Application {
            id: row.id,
            name: row.name,
            repo_id: row.repo_id,
            manifest_path: row.manifest_path,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
