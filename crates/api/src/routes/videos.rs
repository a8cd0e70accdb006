//! Route definitions for the `/videos` resource.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::video;
use crate::state::AppState;

/// Routes mounted at `/videos`.
///
/// ```text
/// GET    /course/{course_id}  -> list a course's videos (public)
/// POST   /                    -> legacy create (instructor/admin)
/// PATCH  /reorder             -> bulk reorder within a course
/// POST   /upload-url          -> create Mux direct-upload session
/// POST   /webhook             -> Mux webhook receiver (signature-gated)
/// GET    /{id}                -> get (auth + access check)
/// PUT    /{id}                -> update metadata (owner/admin)
/// DELETE /{id}                -> delete (owner/admin)
/// GET    /{id}/stats          -> instructor stats (owner/admin)
/// GET    /{id}/status         -> playback status, refreshed from Mux
/// POST   /{id}/sync           -> manual reconciliation against Mux
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(video::create_video))
        .route("/course/{course_id}", get(video::list_course_videos))
        .route("/reorder", patch(video::reorder_videos))
        .route("/upload-url", post(video::create_upload_url))
        .route("/webhook", post(video::mux_webhook))
        .route(
            "/{id}",
            get(video::get_video)
                .put(video::update_video)
                .delete(video::delete_video),
        )
        .route("/{id}/stats", get(video::video_stats))
        .route("/{id}/status", get(video::video_status))
        .route("/{id}/sync", post(video::sync_video))
}
