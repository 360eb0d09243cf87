//! Core domain types
//!
//! These types describe what the deployment tool asks of the container API
//! and what it reads back, independent of the Docker wire format.

pub mod container;
pub mod exec;
pub mod inspect;
