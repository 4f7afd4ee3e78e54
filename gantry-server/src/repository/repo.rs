//! Repo Repository
//!
//! Handles all database operations related to registered repos.

use gantry_core::domain::repo::Repo;
use sqlx::PgPool;
use uuid::Uuid;

/// Create a new repo with empty commit/hash
pub async fn create(pool: &PgPool, url: &str) -> Result<Repo, sqlx::Error> {
    let id = Uuid::new_v4();
    let now = chrono::Utc::now();

    sqlx::query(
        r#"
        INSERT INTO repos (id, url, created_at, updated_at)
        VALUES ($1, $2, $3, $3)
        "#,
    )
    .bind(id)
    .bind(url)
    .bind(now)
    .execute(pool)
    .await?;

    Ok(Repo {
        id,
        url: url.to_string(),
        commit: String::new(),
        hash: String::new(),
        created_at: now,
        updated_at: now,
    })
}

/// List live repos in creation order
pub async fn list(pool: &PgPool) -> Result<Vec<Repo>, sqlx::Error> {
    let rows = sqlx::query_as::<_, RepoRow>(
        r#"
        SELECT id, url, commit, hash, created_at, updated_at
        FROM repos
        WHERE deleted_at IS NULL
        ORDER BY created_at ASC
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|r| r.into()).collect())
}

/// Find a live repo by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Repo>, sqlx::Error> {
    let row = sqlx::query_as::<_, RepoRow>(
        r#"
        SELECT id, url, commit, hash, created_at, updated_at
        FROM repos
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.into()))
}

/// Update the repo URL
pub async fn update_url(pool: &PgPool, id: Uuid, url: &str) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE repos
        SET url = $2, updated_at = $3
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(url)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Record a successful sync. Commit and hash are written in one statement;
/// a failed sync must never leave one of them updated without the other.
pub async fn set_synced(
    pool: &PgPool,
    id: Uuid,
    commit: &str,
    hash: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE repos
        SET commit = $2, hash = $3, updated_at = $4
        WHERE id = $1 AND deleted_at IS NULL
        "#,
    )
    .bind(id)
    .bind(commit)
    .bind(hash)
    .bind(chrono::Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Soft-delete a repo
pub async fn soft_delete(pool: &PgPool, id: Uuid) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        UPDATE repos
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
struct RepoRow {
    id: Uuid,
    url: String,
    commit: String,
    hash: String,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<RepoRow> for Repo {
    fn from(row: RepoRow) -> Self {
        Repo {
            id: row.id,
            url: row.url,
            commit: row.commit,
            hash: row.hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
