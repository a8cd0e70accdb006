//! HTTP handlers, grouped by resource.

pub mod auth;
pub mod course;
pub mod user;
pub mod video;
