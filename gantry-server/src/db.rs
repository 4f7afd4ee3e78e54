use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create repos table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS repos (
            id UUID PRIMARY KEY,
            url TEXT NOT NULL,
            commit VARCHAR(255) NOT NULL DEFAULT '',
            hash VARCHAR(255) NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            deleted_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create applications table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS applications (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL,
            repo_id UUID NOT NULL REFERENCES repos(id),
            manifest_path TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            deleted_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create jobs table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id UUID PRIMARY KEY,
            name VARCHAR(255) NOT NULL UNIQUE,
            application_id UUID NOT NULL REFERENCES applications(id),
            phase VARCHAR(50) NOT NULL,
            observed_version BIGINT NOT NULL DEFAULT 0,
            spec JSONB,
            meta JSONB,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            deleted_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_applications_repo_id ON applications(repo_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_application_id ON jobs(application_id)")
        .execute(pool)
        .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_phase ON jobs(phase)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
