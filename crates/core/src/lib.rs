//! Shared domain types for the Riffline backend.
//!
//! This crate is dependency-light on purpose: it holds the error taxonomy,
//! role and access rules, and the video status state machine, so that both
//! the database layer and the API layer agree on the same definitions.

pub mod access;
pub mod error;
pub mod roles;
pub mod types;
pub mod video_status;
