//! Data transfer objects
//!
//! Payload shapes crossing the HTTP boundary. Serialization itself lives in
//! the server's API layer; these types only carry the data.

pub mod application;
pub mod job;
pub mod repo;
