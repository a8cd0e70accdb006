//! Video processing status state machine.
//!
//! The `videos.status` column is the only real state machine in the system:
//!
//! ```text
//! waiting -> preparing -> ready
//! waiting | preparing  -> errored
//! ```
//!
//! `ready` and `errored` are terminal. Both the webhook path and the manual
//! sync path MUST route status changes through [`VideoStatus::apply`] so the
//! two paths cannot diverge. Re-applying an event a record has already
//! absorbed is a no-op, which is what makes at-least-once webhook delivery
//! safe.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Processing status of a video asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    /// Upload session created; no bytes accepted yet.
    Waiting,
    /// Provider accepted the bytes and is processing.
    Preparing,
    /// Asset is playable; playback id and duration are populated.
    Ready,
    /// Provider-side processing failed.
    Errored,
}

/// Provider-reported lifecycle events that can change a video's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetEvent {
    /// The upload session has an asset attached and processing has begun.
    Processing,
    /// The asset finished processing and is playable.
    Ready,
    /// The asset failed processing.
    Errored,
}

impl VideoStatus {
    /// Apply a provider lifecycle event to the current status.
    ///
    /// Terminal states only move for a genuinely new outcome: a `ready`
    /// record stays `ready` on a duplicate ready event, and an `errored`
    /// record is not resurrected by a late `Processing` event. A `Ready`
    /// event does override `errored` -- the provider's authoritative state
    /// wins when a manual sync re-derives truth.
    pub fn apply(self, event: AssetEvent) -> VideoStatus {
        match (self, event) {
            (_, AssetEvent::Ready) => VideoStatus::Ready,
            (VideoStatus::Ready, AssetEvent::Errored) => VideoStatus::Ready,
            (_, AssetEvent::Errored) => VideoStatus::Errored,
            (VideoStatus::Waiting, AssetEvent::Processing) => VideoStatus::Preparing,
            (current, AssetEvent::Processing) => current,
        }
    }

    /// Stable string form, matching the `videos.status` CHECK constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            VideoStatus::Waiting => "waiting",
            VideoStatus::Preparing => "preparing",
            VideoStatus::Ready => "ready",
            VideoStatus::Errored => "errored",
        }
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VideoStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "waiting" => Ok(VideoStatus::Waiting),
            "preparing" => Ok(VideoStatus::Preparing),
            "ready" => Ok(VideoStatus::Ready),
            "errored" => Ok(VideoStatus::Errored),
            other => Err(format!("unknown video status '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn waiting_progresses_through_preparing_to_ready() {
        let s = VideoStatus::Waiting.apply(AssetEvent::Processing);
        assert_eq!(s, VideoStatus::Preparing);
        assert_eq!(s.apply(AssetEvent::Ready), VideoStatus::Ready);
    }

    #[test]
    fn ready_event_skips_preparing() {
        // Webhooks can arrive before we ever observed the preparing phase.
        assert_eq!(
            VideoStatus::Waiting.apply(AssetEvent::Ready),
            VideoStatus::Ready
        );
    }

    #[test]
    fn duplicate_ready_is_a_noop() {
        let s = VideoStatus::Ready.apply(AssetEvent::Ready);
        assert_eq!(s, VideoStatus::Ready);
    }

    #[test]
    fn errored_is_terminal_for_processing_events() {
        assert_eq!(
            VideoStatus::Errored.apply(AssetEvent::Processing),
            VideoStatus::Errored
        );
    }

    #[test]
    fn ready_wins_over_errored_on_resync() {
        assert_eq!(
            VideoStatus::Errored.apply(AssetEvent::Ready),
            VideoStatus::Ready
        );
    }

    #[test]
    fn ready_is_not_demoted_by_late_errored_event() {
        assert_eq!(
            VideoStatus::Ready.apply(AssetEvent::Errored),
            VideoStatus::Ready
        );
    }

    #[test]
    fn round_trips_through_strings() {
        for s in [
            VideoStatus::Waiting,
            VideoStatus::Preparing,
            VideoStatus::Ready,
            VideoStatus::Errored,
        ] {
            assert_eq!(s.as_str().parse::<VideoStatus>().unwrap(), s);
        }
        assert!("bogus".parse::<VideoStatus>().is_err());
    }
}
