//! Gantry Core
//!
//! Core types and abstractions for the Gantry self-service deployment system.
//!
//! This crate contains:
//! - Domain types: Core business entities (Repo, Application, Job, etc.)
//! - DTOs: Data transfer objects crossing the service boundary

pub mod domain;
pub mod dto;
