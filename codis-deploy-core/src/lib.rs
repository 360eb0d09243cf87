//! Codis Deploy Core
//!
//! Core types shared by the Docker client and the deployment tool.
//!
//! This crate contains:
//! - Domain types: containers, port bindings, inspection snapshots, exec commands
//! - DTOs: Docker remote API request/response bodies and their conversions

pub mod domain;
pub mod dto;
