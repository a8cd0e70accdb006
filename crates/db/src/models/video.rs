//! Video entity model and DTOs.
//!
//! A video is either a legacy record (direct playback URL) or a Mux-ingested
//! record. The invariant "legacy URL or provider identifier" is validated at
//! the API layer; this module only models the row and its derived fields.

use riffline_core::types::{DbId, Timestamp};
use riffline_core::video_status::VideoStatus;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Base URL for Mux HLS playback.
const MUX_STREAM_BASE: &str = "https://stream.mux.com";

/// A row from the `videos` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Video {
    pub id: DbId,
    pub course_id: DbId,
    pub title: String,
    pub description: String,
    pub legacy_video_url: Option<String>,
    pub mux_upload_id: Option<String>,
    pub mux_asset_id: Option<String>,
    pub mux_playback_id: Option<String>,
    pub status: String,
    pub duration_seconds: i32,
    pub thumbnail_url: String,
    pub sort_order: i32,
    pub is_preview: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Video {
    /// Parsed status. Falls back to `waiting` if the column ever holds a
    /// value outside the CHECK constraint.
    pub fn video_status(&self) -> VideoStatus {
        self.status.parse().unwrap_or(VideoStatus::Waiting)
    }

    /// Whether the video can be played right now: the Mux asset is ready,
    /// or a legacy URL exists.
    pub fn is_ready(&self) -> bool {
        self.video_status() == VideoStatus::Ready || self.legacy_video_url.is_some()
    }

    /// Streaming URL: Mux HLS when a playback id exists, else the legacy URL.
    pub fn playback_url(&self) -> Option<String> {
        match &self.mux_playback_id {
            Some(pb) => Some(format!("{MUX_STREAM_BASE}/{pb}.m3u8")),
            None => self.legacy_video_url.clone(),
        }
    }

    /// Duration rendered as `H:MM:SS` (or `M:SS` under an hour).
    pub fn formatted_duration(&self) -> String {
        let total = self.duration_seconds.max(0);
        let hours = total / 3600;
        let minutes = (total % 3600) / 60;
        let seconds = total % 60;
        if hours > 0 {
            format!("{hours}:{minutes:02}:{seconds:02}")
        } else {
            format!("{minutes}:{seconds:02}")
        }
    }
}

/// DTO for the legacy create path (direct URL, metadata supplied up front).
#[derive(Debug, Deserialize)]
pub struct CreateVideo {
    pub course_id: DbId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub legacy_video_url: String,
    pub thumbnail_url: String,
    pub duration_seconds: i32,
    pub sort_order: i32,
    #[serde(default)]
    pub is_preview: bool,
}

/// DTO for creating the pending record of a Mux upload session.
#[derive(Debug)]
pub struct CreatePendingUpload {
    pub course_id: DbId,
    pub title: String,
    pub description: String,
    pub mux_upload_id: String,
    pub sort_order: i32,
    pub is_preview: bool,
}

/// DTO for updating display metadata. All fields are optional; `course_id`
/// is immutable after creation and deliberately absent.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateVideo {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sort_order: Option<i32>,
    pub is_preview: Option<bool>,
    pub legacy_video_url: Option<String>,
}

/// Provider-derived fields persisted by the asset reconciler in a single
/// whole-row merge.
#[derive(Debug, Clone)]
pub struct AssetReadyUpdate {
    pub mux_asset_id: String,
    pub mux_playback_id: Option<String>,
    pub status: String,
    pub duration_seconds: i32,
    pub thumbnail_url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Video {
        Video {
            id: 1,
            course_id: 1,
            title: "Lesson".into(),
            description: String::new(),
            legacy_video_url: None,
            mux_upload_id: Some("up_1".into()),
            mux_asset_id: None,
            mux_playback_id: None,
            status: "waiting".into(),
            duration_seconds: 0,
            thumbnail_url: String::new(),
            sort_order: 1,
            is_preview: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn playback_url_prefers_mux_over_legacy() {
        let mut v = sample();
        v.legacy_video_url = Some("https://cdn.example.com/v.mp4".into());
        assert_eq!(
            v.playback_url().as_deref(),
            Some("https://cdn.example.com/v.mp4")
        );

        v.mux_playback_id = Some("pb_789".into());
        assert_eq!(
            v.playback_url().as_deref(),
            Some("https://stream.mux.com/pb_789.m3u8")
        );
    }

    #[test]
    fn readiness_covers_both_paths() {
        let mut v = sample();
        assert!(!v.is_ready());
        v.status = "ready".into();
        assert!(v.is_ready());

        let mut legacy = sample();
        legacy.legacy_video_url = Some("https://cdn.example.com/v.mp4".into());
        assert!(legacy.is_ready());
    }

    #[test]
    fn duration_formatting() {
        let mut v = sample();
        v.duration_seconds = 142;
        assert_eq!(v.formatted_duration(), "2:22");
        v.duration_seconds = 3723;
        assert_eq!(v.formatted_duration(), "1:02:03");
        v.duration_seconds = 0;
        assert_eq!(v.formatted_duration(), "0:00");
    }
}
