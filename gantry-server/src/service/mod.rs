//! Service Module
//!
//! The coordinators: business logic binding entity lifecycle to the two
//! upstream services. Request-triggered calls run concurrently and share
//! nothing in-process except the store pool.

pub mod application;
pub mod job;
pub mod logs;
pub mod repo;

// Re-export for convenience
pub use application as application_service;
pub use job as job_service;
pub use logs as log_service;
pub use repo as repo_service;
