//! Ingest service: upload session creation, asset state reconciliation,
//! and pull-based manual sync.
//!
//! Webhooks are best-effort push notifications; the manual sync path
//! re-derives the same truth by polling the provider. Both funnel through
//! [`reconcile_asset`] so the two paths cannot diverge.

use riffline_core::types::DbId;
use riffline_core::video_status::{AssetEvent, VideoStatus};
use riffline_db::models::video::{AssetReadyUpdate, CreatePendingUpload, Video};
use riffline_db::repositories::{CourseRepo, VideoRepo};
use sqlx::PgPool;

use crate::provider::{ProviderError, VideoProvider};
use crate::webhook::WebhookEvent;

/// Base URL for Mux static thumbnail images.
const MUX_IMAGE_BASE: &str = "https://image.mux.com";

/// Errors from the ingest flow. The API layer maps these onto the HTTP
/// error taxonomy.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Course {0} not found")]
    CourseNotFound(DbId),

    #[error("Video {0} not found")]
    VideoNotFound(DbId),

    /// A ready event referenced an asset this system never created, or
    /// whose record was deleted. Reported, not retried.
    #[error("No video matches Mux asset '{0}'")]
    AssetNotMatched(String),

    /// Manual sync requested on a record with no upload session.
    #[error("Video {0} has no Mux upload session to sync")]
    NoUploadSession(DbId),

    /// The requested display position is already used by a sibling video.
    #[error("A video with order {order} already exists in course {course_id}")]
    OrderTaken { course_id: DbId, order: i32 },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Input for creating an upload session.
#[derive(Debug)]
pub struct CreateUploadRequest {
    pub course_id: DbId,
    pub title: String,
    pub description: String,
    /// Display position; defaults to one past the course's current last
    /// video.
    pub sort_order: Option<i32>,
    pub is_preview: bool,
}

/// A created upload session: the pending record plus the one-time upload
/// URL the client pushes bytes to.
#[derive(Debug)]
pub struct UploadSession {
    pub video: Video,
    pub upload_url: String,
    pub upload_id: String,
}

/// Outcome of processing one webhook event.
#[derive(Debug)]
pub enum WebhookOutcome {
    /// A ready event was reconciled into the given record.
    Reconciled(Video),
    /// An errored event was applied (or its record was benignly absent).
    ErroredApplied(Option<Video>),
    /// The event type is not one we act on.
    Ignored,
}

/// Outcome of a manual sync.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The provider had attached an asset; the record was reconciled.
    Reconciled(Video),
    /// No asset yet -- the upload is still processing. Stored state was
    /// not touched.
    Processing { upload_id: String },
}

/// Create a Mux direct-upload session and its pending video record.
///
/// One provider call, one video insert. Provider failure propagates with
/// no local retry; the record is only created after the provider call
/// succeeds, so a failed call leaves no orphan row.
pub async fn create_upload_session(
    pool: &PgPool,
    provider: &dyn VideoProvider,
    cors_origin: &str,
    req: CreateUploadRequest,
) -> Result<UploadSession, IngestError> {
    let course = CourseRepo::find_by_id(pool, req.course_id)
        .await?
        .ok_or(IngestError::CourseNotFound(req.course_id))?;

    let sort_order = match req.sort_order {
        Some(order) => {
            if VideoRepo::order_taken(pool, course.id, order, None).await? {
                return Err(IngestError::OrderTaken {
                    course_id: course.id,
                    order,
                });
            }
            order
        }
        None => VideoRepo::next_sort_order(pool, course.id).await?,
    };

    let upload = provider.create_direct_upload(cors_origin).await?;

    let video = VideoRepo::create_pending_upload(
        pool,
        &CreatePendingUpload {
            course_id: course.id,
            title: req.title,
            description: req.description,
            mux_upload_id: upload.id.clone(),
            sort_order,
            is_preview: req.is_preview,
        },
    )
    .await?;

    tracing::info!(
        video_id = video.id,
        course_id = course.id,
        upload_id = %upload.id,
        "Created upload session"
    );

    Ok(UploadSession {
        video,
        upload_url: upload.url,
        upload_id: upload.id,
    })
}

/// Apply one decoded webhook event.
pub async fn handle_event(
    pool: &PgPool,
    provider: &dyn VideoProvider,
    event: WebhookEvent,
) -> Result<WebhookOutcome, IngestError> {
    match event {
        WebhookEvent::AssetReady { asset_id } => {
            let video = VideoRepo::find_by_asset_id(pool, &asset_id)
                .await?
                .ok_or_else(|| IngestError::AssetNotMatched(asset_id.clone()))?;
            let video = reconcile_asset(pool, provider, &video, &asset_id).await?;
            tracing::info!(video_id = video.id, asset_id = %asset_id, status = %video.status, "Reconciled video after ready event");
            Ok(WebhookOutcome::Reconciled(video))
        }
        WebhookEvent::AssetErrored { asset_id } => {
            match VideoRepo::find_by_asset_id(pool, &asset_id).await? {
                Some(video) => {
                    let status = video.video_status().apply(AssetEvent::Errored);
                    let video = VideoRepo::set_status(pool, video.id, status.as_str())
                        .await?
                        .ok_or(IngestError::VideoNotFound(video.id))?;
                    tracing::error!(video_id = video.id, asset_id = %asset_id, "Video processing failed");
                    Ok(WebhookOutcome::ErroredApplied(Some(video)))
                }
                None => {
                    // Informational, not actionable.
                    tracing::warn!(asset_id = %asset_id, "Errored event for unknown asset, ignoring");
                    Ok(WebhookOutcome::ErroredApplied(None))
                }
            }
        }
        WebhookEvent::Ignored { event_type } => {
            tracing::debug!(event_type = %event_type, "Ignoring webhook event");
            Ok(WebhookOutcome::Ignored)
        }
    }
}

/// Manually reconcile one video against the provider.
///
/// The compensating pull path for missed or delayed webhooks. Requires an
/// upload session; the provider is not contacted without one.
pub async fn sync_video(
    pool: &PgPool,
    provider: &dyn VideoProvider,
    video_id: DbId,
) -> Result<SyncOutcome, IngestError> {
    let video = VideoRepo::find_by_id(pool, video_id)
        .await?
        .ok_or(IngestError::VideoNotFound(video_id))?;

    let Some(upload_id) = video.mux_upload_id.clone() else {
        return Err(IngestError::NoUploadSession(video_id));
    };

    let upload = provider.get_upload(&upload_id).await?;

    match upload.asset_id {
        Some(asset_id) => {
            let video = reconcile_asset(pool, provider, &video, &asset_id).await?;
            tracing::info!(video_id = video.id, upload_id = %upload_id, "Video synced with Mux");
            Ok(SyncOutcome::Reconciled(video))
        }
        None => Ok(SyncOutcome::Processing { upload_id }),
    }
}

/// Opportunistically refresh a record's status from the provider.
///
/// Used by the read-path status endpoint when an asset id is already
/// present. Provider failures are logged and swallowed; the caller serves
/// the stored (possibly stale) state.
pub async fn refresh_status(
    pool: &PgPool,
    provider: &dyn VideoProvider,
    video: &Video,
) -> Option<Video> {
    let asset_id = video.mux_asset_id.as_deref()?;

    let asset = match provider.get_asset(asset_id).await {
        Ok(asset) => asset,
        Err(e) => {
            tracing::warn!(video_id = video.id, error = %e, "Failed to refresh Mux asset status");
            return None;
        }
    };

    let event = match asset.status.as_str() {
        "ready" => AssetEvent::Ready,
        "errored" => AssetEvent::Errored,
        _ => AssetEvent::Processing,
    };
    let status = video.video_status().apply(event);
    if status == video.video_status() {
        return None;
    }

    match VideoRepo::set_status(pool, video.id, status.as_str()).await {
        Ok(updated) => updated,
        Err(e) => {
            tracing::warn!(video_id = video.id, error = %e, "Failed to persist refreshed status");
            None
        }
    }
}

/// Fetch authoritative asset detail and merge it into the record.
///
/// Shared by the webhook ready path and the manual sync path. The webhook
/// payload is not trusted: whatever the re-fetched asset reports wins,
/// including a still-processing or errored state. The ready merge is
/// idempotent: every persisted field is derived from provider-reported
/// truth, never from accumulated deltas.
async fn reconcile_asset(
    pool: &PgPool,
    provider: &dyn VideoProvider,
    video: &Video,
    asset_id: &str,
) -> Result<Video, IngestError> {
    let asset = provider.get_asset(asset_id).await?;

    match asset.status.as_str() {
        "ready" => {
            let status = video.video_status().apply(AssetEvent::Ready);
            let playback_id = asset.primary_playback_id().map(str::to_string);
            let thumbnail_url = playback_id
                .as_deref()
                .map(thumbnail_url_for)
                .unwrap_or_default();
            let duration_seconds = asset.duration.unwrap_or(0.0).round() as i32;

            let update = AssetReadyUpdate {
                mux_asset_id: asset_id.to_string(),
                mux_playback_id: playback_id,
                status: status.as_str().to_string(),
                duration_seconds,
                thumbnail_url,
            };

            VideoRepo::apply_asset_ready(pool, video.id, &update)
                .await?
                .ok_or(IngestError::VideoNotFound(video.id))
        }
        other => {
            let event = if other == "errored" {
                AssetEvent::Errored
            } else {
                AssetEvent::Processing
            };
            let status = video.video_status().apply(event);

            VideoRepo::set_asset_id(pool, video.id, asset_id).await?;
            VideoRepo::set_status(pool, video.id, status.as_str())
                .await?
                .ok_or(IngestError::VideoNotFound(video.id))
        }
    }
}

/// Mux static-image convention: frame at t=0 of the playback stream.
fn thumbnail_url_for(playback_id: &str) -> String {
    format!("{MUX_IMAGE_BASE}/{playback_id}/thumbnail.jpg?time=0")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thumbnail_follows_mux_image_convention() {
        assert_eq!(
            thumbnail_url_for("pb_789"),
            "https://image.mux.com/pb_789/thumbnail.jpg?time=0"
        );
    }
}
