//! Core domain types
//!
//! The fundamental business entities of the system, shared between the
//! server (for persistence) and the upstream client adapters.

pub mod application;
pub mod job;
pub mod manifest;
pub mod repo;
