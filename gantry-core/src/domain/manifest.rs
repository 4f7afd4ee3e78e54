//! Manifest domain types

use serde::{Deserialize, Serialize};

/// A single rendered manifest returned by the sync service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// File name relative to the application's manifest path.
    pub name: String,
    /// Rendered manifest content.
    pub content: String,
}
