//! Debounced posture alerts.
//!
//! An alert fires when the status goes from good to bad, and at most once
//! per cooldown window. Staying bad never re-fires.

use std::time::Duration;

use serde::Serialize;

use posturemaxx_common::clock::duration_to_ns;
use posturemaxx_pose_model::frame::TimestampNs;
use posturemaxx_pose_model::settings::AlertSettings;
use posturemaxx_pose_model::status::PostureStatus;

use crate::processor::PostureUpdate;

pub const ALERT_TITLE: &str = "Posture Alert";
pub const ALERT_BODY: &str = "Please adjust your sitting position";

/// A user-facing alert to deliver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostureAlert {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,
    pub title: String,
    pub body: String,
}

/// Turns a stream of updates into rate-limited alerts.
#[derive(Debug, Clone)]
pub struct AlertDebouncer {
    cooldown_ns: u64,
    last_status: PostureStatus,
    last_alert_ns: Option<TimestampNs>,
    alerts_fired: u64,
}

impl AlertDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown_ns: duration_to_ns(cooldown),
            last_status: PostureStatus::NotFound,
            last_alert_ns: None,
            alerts_fired: 0,
        }
    }

    pub fn from_settings(settings: &AlertSettings) -> Self {
        Self::new(Duration::from_secs(settings.cooldown_secs))
    }

    /// Feed one update; returns an alert if one should be delivered now.
    pub fn observe(&mut self, update: &PostureUpdate) -> Option<PostureAlert> {
        let previous = std::mem::replace(&mut self.last_status, update.status);
        if previous != PostureStatus::Good || update.status != PostureStatus::Bad {
            return None;
        }

        if let Some(last) = self.last_alert_ns {
            let since = update.timestamp_ns.saturating_sub(last);
            if since < self.cooldown_ns {
                tracing::debug!(
                    t = update.timestamp_ns,
                    since_last_ms = since / 1_000_000,
                    "Posture alert suppressed by cooldown"
                );
                return None;
            }
        }

        self.last_alert_ns = Some(update.timestamp_ns);
        self.alerts_fired += 1;
        tracing::info!(t = update.timestamp_ns, "Posture alert");

        Some(PostureAlert {
            timestamp_ns: update.timestamp_ns,
            title: ALERT_TITLE.to_string(),
            body: ALERT_BODY.to_string(),
        })
    }

    /// Forget the previous status. The cooldown keeps running.
    pub fn reset(&mut self) {
        self.last_status = PostureStatus::NotFound;
    }

    pub fn alerts_fired(&self) -> u64 {
        self.alerts_fired
    }
}

impl Default for AlertDebouncer {
    fn default() -> Self {
        Self::from_settings(&AlertSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEC: u64 = 1_000_000_000;

    fn update(t_secs: u64, status: PostureStatus) -> PostureUpdate {
        PostureUpdate {
            timestamp_ns: t_secs * SEC,
            status,
            previous_status: PostureStatus::NotFound,
            neck_angle_deg: None,
            shoulder_tilt_deg: None,
            smoothed: None,
        }
    }

    #[test]
    fn test_fires_on_good_to_bad_only() {
        let mut debouncer = AlertDebouncer::new(Duration::from_secs(0));
        assert!(debouncer.observe(&update(0, PostureStatus::Bad)).is_none());
        assert!(debouncer.observe(&update(1, PostureStatus::Good)).is_none());

        let alert = debouncer.observe(&update(2, PostureStatus::Bad)).unwrap();
        assert_eq!(alert.timestamp_ns, 2 * SEC);
        assert_eq!(alert.title, ALERT_TITLE);
        assert_eq!(alert.body, ALERT_BODY);
    }

    #[test]
    fn test_oversized_cooldown_does_not_wrap() {
        let mut debouncer = AlertDebouncer::from_settings(&AlertSettings {
            cooldown_secs: 18_446_744_074,
        });
        debouncer.observe(&update(0, PostureStatus::Good));
        assert!(debouncer.observe(&update(1, PostureStatus::Bad)).is_some());
        debouncer.observe(&update(2, PostureStatus::Good));
        assert!(debouncer.observe(&update(3, PostureStatus::Bad)).is_none());
    }

    #[test]
    fn test_sustained_bad_does_not_refire() {
        let mut debouncer = AlertDebouncer::new(Duration::from_secs(0));
        debouncer.observe(&update(0, PostureStatus::Good));
        assert!(debouncer.observe(&update(1, PostureStatus::Bad)).is_some());
        for t in 2..10 {
            assert!(debouncer.observe(&update(t, PostureStatus::Bad)).is_none());
        }
        assert_eq!(debouncer.alerts_fired(), 1);
    }

    #[test]
    fn test_not_found_to_bad_does_not_fire() {
        let mut debouncer = AlertDebouncer::new(Duration::from_secs(0));
        debouncer.observe(&update(0, PostureStatus::Good));
        debouncer.observe(&update(1, PostureStatus::NotFound));
        assert!(debouncer.observe(&update(2, PostureStatus::Bad)).is_none());
    }

    #[test]
    fn test_cooldown_suppresses_repeat_alerts() {
        let mut debouncer = AlertDebouncer::new(Duration::from_secs(3600));
        debouncer.observe(&update(0, PostureStatus::Good));
        assert!(debouncer.observe(&update(10, PostureStatus::Bad)).is_some());

        debouncer.observe(&update(20, PostureStatus::Good));
        assert!(debouncer.observe(&update(30, PostureStatus::Bad)).is_none());

        debouncer.observe(&update(3700, PostureStatus::Good));
        assert!(debouncer.observe(&update(3710, PostureStatus::Bad)).is_some());
        assert_eq!(debouncer.alerts_fired(), 2);
    }

    #[test]
    fn test_reset_forgets_status_but_keeps_cooldown() {
        let mut debouncer = AlertDebouncer::new(Duration::from_secs(60));
        debouncer.observe(&update(0, PostureStatus::Good));
        assert!(debouncer.observe(&update(1, PostureStatus::Bad)).is_some());

        debouncer.reset();
        debouncer.observe(&update(2, PostureStatus::Good));
        assert!(debouncer.observe(&update(3, PostureStatus::Bad)).is_none());
    }
}
