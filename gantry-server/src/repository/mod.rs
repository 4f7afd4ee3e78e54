//! Repository Module
//!
//! Data access layer for the coordinator. Each repository handles database
//! operations for a single entity; rows are soft-deleted and every read
//! excludes deleted rows. Row-level writes are the only serialization point
//! between concurrent callers.

pub mod application;
pub mod job;
pub mod repo;

// Re-export for convenience
pub use application as application_repository;
pub use job as job_repository;
pub use repo as repo_repository;

/// True when the error is a unique-constraint violation, used to map job
/// name collisions to a conflict.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => db.is_unique_violation(),
        _ => false,
    }
}
