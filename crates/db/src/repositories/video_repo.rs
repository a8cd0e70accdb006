//! Repository for the `videos` table.
//!
//! The reconciliation write path ([`VideoRepo::apply_asset_ready`]) persists
//! all provider-derived fields in one statement, so concurrent deliveries of
//! the same event converge on the same row state (last writer wins on
//! identical values).

use riffline_core::types::DbId;
use sqlx::PgPool;

use crate::models::video::{
    AssetReadyUpdate, CreatePendingUpload, CreateVideo, UpdateVideo, Video,
};

/// Column list for `videos` queries.
const VIDEO_COLUMNS: &str = "\
    id, course_id, title, description, legacy_video_url, \
    mux_upload_id, mux_asset_id, mux_playback_id, status, \
    duration_seconds, thumbnail_url, sort_order, is_preview, \
    created_at, updated_at";

/// Provides CRUD and reconciliation operations for videos.
pub struct VideoRepo;

impl VideoRepo {
    /// Insert a legacy video (direct URL, full metadata supplied up front).
    /// The status column keeps its default; playability for legacy records
    /// is derived from `legacy_video_url`, not from the Mux pipeline state.
    pub async fn create(pool: &PgPool, input: &CreateVideo) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos \
                (course_id, title, description, legacy_video_url, thumbnail_url, \
                 duration_seconds, sort_order, is_preview) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
             RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(input.course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.legacy_video_url)
            .bind(&input.thumbnail_url)
            .bind(input.duration_seconds)
            .bind(input.sort_order)
            .bind(input.is_preview)
            .fetch_one(pool)
            .await
    }

    /// Insert the pending record of a Mux upload session (`status=waiting`,
    /// no asset yet).
    pub async fn create_pending_upload(
        pool: &PgPool,
        input: &CreatePendingUpload,
    ) -> Result<Video, sqlx::Error> {
        let query = format!(
            "INSERT INTO videos \
                (course_id, title, description, mux_upload_id, sort_order, is_preview) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(input.course_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.mux_upload_id)
            .bind(input.sort_order)
            .bind(input.is_preview)
            .fetch_one(pool)
            .await
    }

    /// Find a video by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a video by its Mux asset id (webhook lookup path).
    pub async fn find_by_asset_id(
        pool: &PgPool,
        asset_id: &str,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!("SELECT {VIDEO_COLUMNS} FROM videos WHERE mux_asset_id = $1");
        sqlx::query_as::<_, Video>(&query)
            .bind(asset_id)
            .fetch_optional(pool)
            .await
    }

    /// List a course's videos in display order.
    pub async fn list_by_course(
        pool: &PgPool,
        course_id: DbId,
        include_preview: bool,
    ) -> Result<Vec<Video>, sqlx::Error> {
        let query = if include_preview {
            format!(
                "SELECT {VIDEO_COLUMNS} FROM videos \
                 WHERE course_id = $1 ORDER BY sort_order"
            )
        } else {
            format!(
                "SELECT {VIDEO_COLUMNS} FROM videos \
                 WHERE course_id = $1 AND NOT is_preview ORDER BY sort_order"
            )
        };
        sqlx::query_as::<_, Video>(&query)
            .bind(course_id)
            .fetch_all(pool)
            .await
    }

    /// Whether a sibling video in the same course already uses this order
    /// value. `exclude_id` skips the video being updated.
    pub async fn order_taken(
        pool: &PgPool,
        course_id: DbId,
        sort_order: i32,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let taken: Option<DbId> = sqlx::query_scalar(
            "SELECT id FROM videos \
             WHERE course_id = $1 AND sort_order = $2 AND ($3::bigint IS NULL OR id != $3) \
             LIMIT 1",
        )
        .bind(course_id)
        .bind(sort_order)
        .bind(exclude_id)
        .fetch_optional(pool)
        .await?;
        Ok(taken.is_some())
    }

    /// Next free display position: one past the course's current maximum.
    pub async fn next_sort_order(pool: &PgPool, course_id: DbId) -> Result<i32, sqlx::Error> {
        let max: Option<i32> =
            sqlx::query_scalar("SELECT MAX(sort_order) FROM videos WHERE course_id = $1")
                .bind(course_id)
                .fetch_one(pool)
                .await?;
        Ok(max.unwrap_or(0) + 1)
    }

    /// Patch display metadata. Only provided fields change; `course_id` and
    /// the provider identifiers are never touched here.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateVideo,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                sort_order = COALESCE($4, sort_order), \
                is_preview = COALESCE($5, is_preview), \
                legacy_video_url = COALESCE($6, legacy_video_url), \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(input.title.as_deref())
            .bind(input.description.as_deref())
            .bind(input.sort_order)
            .bind(input.is_preview)
            .bind(input.legacy_video_url.as_deref())
            .fetch_optional(pool)
            .await
    }

    /// Assign a new display position (bulk reorder path).
    pub async fn set_sort_order(
        pool: &PgPool,
        id: DbId,
        sort_order: i32,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET sort_order = $2, updated_at = now() \
             WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(sort_order)
            .fetch_optional(pool)
            .await
    }

    /// Record the provider asset id on a record (sync path, before the
    /// ready merge).
    pub async fn set_asset_id(
        pool: &PgPool,
        id: DbId,
        asset_id: &str,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET mux_asset_id = $2, updated_at = now() \
             WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(asset_id)
            .fetch_optional(pool)
            .await
    }

    /// Persist the reconciler's ready-state merge in a single statement.
    /// Applying the same merge twice leaves the row unchanged.
    pub async fn apply_asset_ready(
        pool: &PgPool,
        id: DbId,
        update: &AssetReadyUpdate,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET \
                mux_asset_id = $2, \
                mux_playback_id = $3, \
                status = $4, \
                duration_seconds = $5, \
                thumbnail_url = $6, \
                updated_at = now() \
             WHERE id = $1 \
             RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(&update.mux_asset_id)
            .bind(update.mux_playback_id.as_deref())
            .bind(&update.status)
            .bind(update.duration_seconds)
            .bind(&update.thumbnail_url)
            .fetch_optional(pool)
            .await
    }

    /// Set only the status column (errored path, opportunistic refresh).
    pub async fn set_status(
        pool: &PgPool,
        id: DbId,
        status: &str,
    ) -> Result<Option<Video>, sqlx::Error> {
        let query = format!(
            "UPDATE videos SET status = $2, updated_at = now() \
             WHERE id = $1 RETURNING {VIDEO_COLUMNS}"
        );
        sqlx::query_as::<_, Video>(&query)
            .bind(id)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    /// Delete a video.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM videos WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
