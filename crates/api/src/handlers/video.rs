//! Handlers for the `/videos` resource.
//!
//! Covers course video CRUD (legacy direct-URL records), the Mux ingest
//! surface (upload sessions, the signed webhook, manual sync), and the
//! playback status read path.

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use riffline_core::access;
use riffline_core::error::CoreError;
use riffline_core::roles::ROLE_ADMIN;
use riffline_core::types::DbId;
use riffline_db::models::video::{CreateVideo, UpdateVideo, Video};
use riffline_db::repositories::{CourseRepo, UserRepo, VideoRepo};
use riffline_mux::ingest::{self, CreateUploadRequest, SyncOutcome};
use riffline_mux::webhook::{decode_event, verify_signature};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireInstructor;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Query / request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ListVideosParams {
    /// When `false`, preview videos are filtered out of the listing.
    pub include_preview: Option<bool>,
}

/// Request body for `POST /videos/upload-url`.
#[derive(Debug, Deserialize)]
pub struct CreateUploadUrlRequest {
    pub course_id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    /// Display position; defaults to the end of the course.
    pub sort_order: Option<i32>,
    #[serde(default)]
    pub is_preview: bool,
}

/// Request body for `PATCH /videos/reorder`.
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub course_id: DbId,
    pub orders: Vec<ReorderEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderEntry {
    pub video_id: DbId,
    pub sort_order: i32,
}

/// A video row plus its derived playback fields.
#[derive(Debug, Serialize)]
pub struct VideoDetail {
    #[serde(flatten)]
    pub video: Video,
    pub is_ready: bool,
    pub playback_url: Option<String>,
}

impl From<Video> for VideoDetail {
    fn from(video: Video) -> Self {
        let is_ready = video.is_ready();
        let playback_url = video.playback_url();
        VideoDetail {
            video,
            is_ready,
            playback_url,
        }
    }
}

/// Response body for `POST /videos/upload-url`.
#[derive(Debug, Serialize)]
pub struct UploadUrlResponse {
    pub video: Video,
    /// One-time URL the client PUTs the video file to.
    pub upload_url: String,
    pub upload_id: String,
}

/// Playback status payload for the status and sync endpoints.
#[derive(Debug, Serialize)]
pub struct VideoStatusResponse {
    pub status: String,
    pub is_ready: bool,
    pub playback_url: Option<String>,
    pub duration_seconds: i32,
    pub thumbnail_url: String,
}

impl From<&Video> for VideoStatusResponse {
    fn from(video: &Video) -> Self {
        VideoStatusResponse {
            status: video.status.clone(),
            is_ready: video.is_ready(),
            playback_url: video.playback_url(),
            duration_seconds: video.duration_seconds,
            thumbnail_url: video.thumbnail_url.clone(),
        }
    }
}

/// Response body for `POST /videos/{id}/sync`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SyncResponse {
    Reconciled(VideoStatusResponse),
    Processing {
        status: &'static str,
        upload_id: String,
    },
}

/// Response body for `GET /videos/{id}/stats`.
#[derive(Debug, Serialize)]
pub struct VideoStats {
    pub video_id: DbId,
    pub title: String,
    pub status: String,
    pub duration_seconds: i32,
    pub formatted_duration: String,
    pub sort_order: i32,
    pub is_preview: bool,
}

/// Acknowledgement envelope for the webhook endpoint. Mux expects a plain
/// success flag, not this API's `{ "data": ... }` convention.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WebhookAck {
    fn ok() -> Self {
        WebhookAck {
            success: true,
            error: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        WebhookAck {
            success: false,
            error: Some(error.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a video and verify the caller owns its course (or is an admin).
async fn find_owned_video(state: &AppState, user: &AuthUser, video_id: DbId) -> AppResult<Video> {
    let video = VideoRepo::find_by_id(&state.pool, video_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id: video_id,
        }))?;

    if user.role != ROLE_ADMIN {
        let course = CourseRepo::find_by_id(&state.pool, video.course_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Course",
                id: video.course_id,
            }))?;
        if course.instructor_id != user.user_id {
            return Err(AppError::Core(CoreError::Forbidden(
                "You do not own this video's course".into(),
            )));
        }
    }

    Ok(video)
}

/// Reject a display position already used by a sibling video.
async fn ensure_order_free(
    state: &AppState,
    course_id: DbId,
    sort_order: i32,
    exclude_id: Option<DbId>,
) -> AppResult<()> {
    if sort_order < 1 {
        return Err(AppError::Core(CoreError::Validation(
            "Video order must be a positive integer".into(),
        )));
    }
    if VideoRepo::order_taken(&state.pool, course_id, sort_order, exclude_id).await? {
        return Err(AppError::Core(CoreError::Validation(format!(
            "A video with order {sort_order} already exists in this course"
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CRUD handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/videos/course/{course_id}
///
/// A course's videos in display order. Public; playback access is
/// enforced per-video by `get_video`.
pub async fn list_course_videos(
    State(state): State<AppState>,
    Path(course_id): Path<DbId>,
    Query(params): Query<ListVideosParams>,
) -> AppResult<Json<DataResponse<Vec<VideoDetail>>>> {
    CourseRepo::find_by_id(&state.pool, course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: course_id,
        }))?;

    let include_preview = params.include_preview.unwrap_or(true);
    let videos = VideoRepo::list_by_course(&state.pool, course_id, include_preview).await?;

    Ok(Json(DataResponse {
        data: videos.into_iter().map(VideoDetail::from).collect(),
    }))
}

/// GET /api/v1/videos/{id}
///
/// Requires authentication. Preview videos are open to any authenticated
/// user; full videos require an active subscription, course ownership, or
/// the admin role.
pub async fn get_video(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<VideoDetail>>> {
    let video = VideoRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id,
        }))?;

    let viewer = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::Unauthorized(
            "Account no longer exists".into(),
        )))?;

    let mut allowed = access::can_watch_video(
        &viewer.role,
        viewer.has_active_subscription(),
        video.is_preview,
    );

    // Instructors always see their own course content.
    if !allowed {
        if let Some(course) = CourseRepo::find_by_id(&state.pool, video.course_id).await? {
            allowed = course.instructor_id == viewer.id;
        }
    }

    if !allowed {
        return Err(AppError::Core(CoreError::Forbidden(
            "An active subscription is required to watch this video".into(),
        )));
    }

    Ok(Json(DataResponse { data: video.into() }))
}

/// POST /api/v1/videos
///
/// Legacy create path: a direct playback URL with metadata supplied up
/// front. Mux-backed videos are created via `POST /videos/upload-url`.
pub async fn create_video(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<CreateVideo>,
) -> AppResult<(StatusCode, Json<DataResponse<VideoDetail>>)> {
    let course = CourseRepo::find_by_id(&state.pool, input.course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: input.course_id,
        }))?;

    if user.role != ROLE_ADMIN && course.instructor_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this course".into(),
        )));
    }

    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Video title must not be empty".into(),
        )));
    }
    if input.legacy_video_url.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "A video URL is required for the legacy create path".into(),
        )));
    }
    if input.duration_seconds < 0 {
        return Err(AppError::Core(CoreError::Validation(
            "Video duration must not be negative".into(),
        )));
    }

    ensure_order_free(&state, course.id, input.sort_order, None).await?;

    let video = VideoRepo::create(&state.pool, &input).await?;
    tracing::info!(video_id = video.id, course_id = course.id, "Created legacy video");

    Ok((
        StatusCode::CREATED,
        Json(DataResponse { data: video.into() }),
    ))
}

/// PUT /api/v1/videos/{id}
///
/// Updates display metadata. `course_id` is immutable after creation.
pub async fn update_video(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
    Json(input): Json<UpdateVideo>,
) -> AppResult<Json<DataResponse<VideoDetail>>> {
    let video = find_owned_video(&state, &user, id).await?;

    if let Some(title) = &input.title {
        if title.trim().is_empty() {
            return Err(AppError::Core(CoreError::Validation(
                "Video title must not be empty".into(),
            )));
        }
    }

    if let Some(sort_order) = input.sort_order {
        if sort_order != video.sort_order {
            ensure_order_free(&state, video.course_id, sort_order, Some(video.id)).await?;
        }
    }

    let video = VideoRepo::update(&state.pool, id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id,
        }))?;

    Ok(Json(DataResponse { data: video.into() }))
}

/// DELETE /api/v1/videos/{id}
pub async fn delete_video(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    find_owned_video(&state, &user, id).await?;

    let deleted = VideoRepo::delete(&state.pool, id).await?;
    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Video",
            id,
        }));
    }

    tracing::info!(video_id = id, "Deleted video");
    Ok(StatusCode::NO_CONTENT)
}

/// PATCH /api/v1/videos/reorder
///
/// Bulk order assignment within one course. The whole set is validated
/// (positive, no duplicates, every video in the course) before any row is
/// touched.
pub async fn reorder_videos(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<ReorderRequest>,
) -> AppResult<Json<DataResponse<Vec<VideoDetail>>>> {
    let course = CourseRepo::find_by_id(&state.pool, input.course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: input.course_id,
        }))?;

    if user.role != ROLE_ADMIN && course.instructor_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this course".into(),
        )));
    }

    if input.orders.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "At least one video order is required".into(),
        )));
    }

    let mut seen = std::collections::HashSet::new();
    for entry in &input.orders {
        if entry.sort_order < 1 {
            return Err(AppError::Core(CoreError::Validation(
                "Video order must be a positive integer".into(),
            )));
        }
        if !seen.insert(entry.sort_order) {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Duplicate order {} in reorder request",
                entry.sort_order
            ))));
        }
    }

    // Every target must exist and belong to the course before any write.
    for entry in &input.orders {
        let video = VideoRepo::find_by_id(&state.pool, entry.video_id)
            .await?
            .ok_or(AppError::Core(CoreError::NotFound {
                entity: "Video",
                id: entry.video_id,
            }))?;
        if video.course_id != course.id {
            return Err(AppError::Core(CoreError::Validation(format!(
                "Video {} does not belong to course {}",
                entry.video_id, course.id
            ))));
        }
    }

    for entry in &input.orders {
        VideoRepo::set_sort_order(&state.pool, entry.video_id, entry.sort_order).await?;
    }

    let videos = VideoRepo::list_by_course(&state.pool, course.id, true).await?;
    tracing::info!(course_id = course.id, count = input.orders.len(), "Reordered videos");

    Ok(Json(DataResponse {
        data: videos.into_iter().map(VideoDetail::from).collect(),
    }))
}

/// GET /api/v1/videos/{id}/stats
pub async fn video_stats(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<VideoStats>>> {
    let video = find_owned_video(&state, &user, id).await?;

    let stats = VideoStats {
        video_id: video.id,
        title: video.title.clone(),
        status: video.status.clone(),
        duration_seconds: video.duration_seconds,
        formatted_duration: video.formatted_duration(),
        sort_order: video.sort_order,
        is_preview: video.is_preview,
    };

    Ok(Json(DataResponse { data: stats }))
}

// ---------------------------------------------------------------------------
// Mux ingest handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/videos/upload-url
///
/// Create a Mux direct-upload session and its pending video record.
pub async fn create_upload_url(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Json(input): Json<CreateUploadUrlRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<UploadUrlResponse>>)> {
    if input.title.trim().is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Video title must not be empty".into(),
        )));
    }

    // Ownership is checked here; the ingest service only re-checks
    // existence.
    let course = CourseRepo::find_by_id(&state.pool, input.course_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Course",
            id: input.course_id,
        }))?;
    if user.role != ROLE_ADMIN && course.instructor_id != user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You do not own this course".into(),
        )));
    }

    let provider = state.provider()?;
    let session = ingest::create_upload_session(
        &state.pool,
        provider,
        &state.config.frontend_url,
        CreateUploadRequest {
            course_id: input.course_id,
            title: input.title,
            description: input.description,
            sort_order: input.sort_order,
            is_preview: input.is_preview,
        },
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: UploadUrlResponse {
                video: session.video,
                upload_url: session.upload_url,
                upload_id: session.upload_id,
            },
        }),
    ))
}

/// POST /api/v1/videos/webhook
///
/// Mux webhook receiver. The signature is verified against the raw body
/// bytes before any JSON parsing; an invalid signature is rejected with
/// 401 and no further processing.
pub async fn mux_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, Json<WebhookAck>) {
    let signature = headers
        .get("mux-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !verify_signature(&body, signature, state.webhook_secret.as_deref()) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(WebhookAck::failed("Invalid webhook signature")),
        );
    }

    let event = match decode_event(&body) {
        Ok(event) => event,
        Err(msg) => {
            tracing::warn!(error = %msg, "Undecodable Mux webhook body");
            return (StatusCode::BAD_REQUEST, Json(WebhookAck::failed(msg)));
        }
    };

    let provider = match state.provider.as_deref() {
        Some(provider) => provider,
        None => {
            tracing::error!("Received Mux webhook but Mux is not configured");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WebhookAck::failed("Mux is not configured")),
            );
        }
    };

    match ingest::handle_event(&state.pool, provider, event).await {
        Ok(_) => (StatusCode::OK, Json(WebhookAck::ok())),
        Err(err @ ingest::IngestError::AssetNotMatched(_)) => {
            (StatusCode::NOT_FOUND, Json(WebhookAck::failed(err.to_string())))
        }
        Err(err) => {
            tracing::error!(error = %err, "Webhook processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(WebhookAck::failed("Webhook processing failed")),
            )
        }
    }
}

/// GET /api/v1/videos/{id}/status
///
/// Current playback status, opportunistically refreshed from Mux when an
/// asset id is on file. Provider failures here are logged and the stored
/// state served; the manual sync endpoint is the hard refresh.
pub async fn video_status(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<VideoStatusResponse>>> {
    let mut video = find_owned_video(&state, &user, id).await?;

    if let Some(provider) = state.provider.as_deref() {
        if let Some(refreshed) = ingest::refresh_status(&state.pool, provider, &video).await {
            video = refreshed;
        }
    }

    Ok(Json(DataResponse {
        data: VideoStatusResponse::from(&video),
    }))
}

/// POST /api/v1/videos/{id}/sync
///
/// Manual reconciliation against Mux for missed or delayed webhooks.
pub async fn sync_video(
    State(state): State<AppState>,
    RequireInstructor(user): RequireInstructor,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<SyncResponse>>> {
    find_owned_video(&state, &user, id).await?;

    let provider = state.provider()?;
    let outcome = ingest::sync_video(&state.pool, provider, id).await?;

    let response = match outcome {
        SyncOutcome::Reconciled(video) => SyncResponse::Reconciled(VideoStatusResponse::from(&video)),
        SyncOutcome::Processing { upload_id } => SyncResponse::Processing {
            status: "processing",
            upload_id,
        },
    };

    Ok(Json(DataResponse { data: response }))
}
