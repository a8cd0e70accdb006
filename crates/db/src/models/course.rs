//! Course entity model and DTOs.

use riffline_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `courses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Course {
    pub id: DbId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub level: String,
    pub price_cents: i32,
    pub thumbnail_url: String,
    pub instructor_id: DbId,
    pub is_published: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new course.
#[derive(Debug, Deserialize)]
pub struct CreateCourse {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub price_cents: i32,
    #[serde(default)]
    pub thumbnail_url: String,
}

fn default_level() -> String {
    "beginner".to_string()
}

/// DTO for updating an existing course. All fields are optional.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub level: Option<String>,
    pub price_cents: Option<i32>,
    pub thumbnail_url: Option<String>,
}
