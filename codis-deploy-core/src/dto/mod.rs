//! Data Transfer Objects for the Docker remote API
//!
//! Field names follow the Docker Engine API (PascalCase JSON). Conversions
//! to and from the domain types live next to each DTO.

pub mod container;
pub mod exec;
pub mod image;

use serde::{Deserialize, Serialize};

/// Error body returned by the Docker API on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}
