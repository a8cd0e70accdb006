//! Subscription and video access rules.

use crate::roles::ROLE_ADMIN;
use crate::types::Timestamp;

/// Whether a subscription is currently active.
///
/// A subscription row is active when its status is `active` and it has not
/// passed its expiry timestamp (a missing expiry means open-ended).
pub fn has_active_subscription(
    status: &str,
    expires_at: Option<Timestamp>,
    now: Timestamp,
) -> bool {
    status == "active" && expires_at.map_or(true, |at| at > now)
}

/// Whether a viewer may watch a given video.
///
/// Admins see everything. Preview videos are visible without a subscription;
/// everything else requires an active one. Instructor ownership of the
/// course is checked separately by the handlers.
pub fn can_watch_video(role: &str, has_subscription: bool, is_preview: bool) -> bool {
    role == ROLE_ADMIN || is_preview || has_subscription
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn active_unexpired_subscription_counts() {
        let now = Utc::now();
        assert!(has_active_subscription(
            "active",
            Some(now + Duration::days(30)),
            now
        ));
        assert!(has_active_subscription("active", None, now));
    }

    #[test]
    fn expired_or_canceled_subscription_does_not_count() {
        let now = Utc::now();
        assert!(!has_active_subscription(
            "active",
            Some(now - Duration::days(1)),
            now
        ));
        assert!(!has_active_subscription("canceled", None, now));
        assert!(!has_active_subscription("none", None, now));
    }

    #[test]
    fn previews_are_open_but_full_videos_need_a_subscription() {
        assert!(can_watch_video("student", false, true));
        assert!(!can_watch_video("student", false, false));
        assert!(can_watch_video("student", true, false));
        assert!(can_watch_video("admin", false, false));
    }
}
