//! Repository for the `courses` table.

use riffline_core::types::DbId;
use sqlx::PgPool;

use crate::models::course::{Course, CreateCourse, UpdateCourse};

/// Column list for `courses` queries.
const COURSE_COLUMNS: &str = "\
    id, title, description, category, level, price_cents, thumbnail_url, \
    instructor_id, is_published, created_at, updated_at";

/// Provides CRUD operations for courses.
pub struct CourseRepo;

impl CourseRepo {
    /// Create a new course owned by the given instructor.
    pub async fn create(
        pool: &PgPool,
        instructor_id: DbId,
        input: &CreateCourse,
    ) -> Result<Course, sqlx::Error> {
        let query = format!(
            "INSERT INTO courses \
                (title, description, category, level, price_cents, thumbnail_url, instructor_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.level)
            .bind(input.price_cents)
            .bind(&input.thumbnail_url)
            .bind(instructor_id)
            .fetch_one(pool)
            .await
    }

    /// Find a course by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Course>, sqlx::Error> {
        let query = format!("SELECT {COURSE_COLUMNS} FROM courses WHERE id = $1");
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List courses, optionally restricted to published ones.
    pub async fn list(pool: &PgPool, published_only: bool) -> Result<Vec<Course>, sqlx::Error> {
        let query = if published_only {
            format!(
                "SELECT {COURSE_COLUMNS} FROM courses WHERE is_published ORDER BY created_at DESC"
            )
        } else {
            format!("SELECT {COURSE_COLUMNS} FROM courses ORDER BY created_at DESC")
        };
        sqlx::query_as::<_, Course>(&query).fetch_all(pool).await
    }

    /// List courses owned by one instructor.
    pub async fn list_by_instructor(
        pool: &PgPool,
        instructor_id: DbId,
    ) -> Result<Vec<Course>, sqlx::Error> {
        let query = format!(
            "SELECT {COURSE_COLUMNS} FROM courses \
             WHERE instructor_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(instructor_id)
            .fetch_all(pool)
            .await
    }

    /// Patch course fields. Only provided fields change.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCourse,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                category = COALESCE($4, category), \
                level = COALESCE($5, level), \
                price_cents = COALESCE($6, price_cents), \
                thumbnail_url = COALESCE($7, thumbnail_url), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(input.title.as_deref())
            .bind(input.description.as_deref())
            .bind(input.category.as_deref())
            .bind(input.level.as_deref())
            .bind(input.price_cents)
            .bind(input.thumbnail_url.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Set the published flag.
    pub async fn set_published(
        pool: &PgPool,
        id: DbId,
        is_published: bool,
    ) -> Result<Option<Course>, sqlx::Error> {
        let query = format!(
            "UPDATE courses SET is_published = $2, updated_at = now() \
             WHERE id = $1 RETURNING {COURSE_COLUMNS}"
        );
        sqlx::query_as::<_, Course>(&query)
            .bind(id)
            .bind(is_published)
            .fetch_optional(pool)
            .await
    }

    /// Delete a course. Videos cascade via the foreign key.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
