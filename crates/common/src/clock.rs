//! Clock and frame-gating utilities.
//!
//! Frame timestamps are monotonic nanoseconds since capture start. This
//! module provides:
//! - A session clock anchored at capture start
//! - The frame gate that bounds how often pose frames are processed

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

/// A monotonic clock anchored to the moment a capture session started.
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant capture started.
    epoch: Instant,

    /// Wall-clock time at epoch.
    epoch_wall: DateTime<Utc>,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: Utc::now(),
        }
    }

    /// Get nanoseconds elapsed since capture start.
    pub fn elapsed_ns(&self) -> u64 {
        duration_to_ns(self.epoch.elapsed())
    }

    /// Wall-clock time at capture start.
    pub fn epoch_wall(&self) -> DateTime<Utc> {
        self.epoch_wall
    }

    /// Convert an elapsed nanosecond value to seconds.
    pub fn ns_to_secs(ns: u64) -> f64 {
        ns as f64 / 1_000_000_000.0
    }
}

/// Nanoseconds in `duration`, saturating at `u64::MAX`.
pub fn duration_to_ns(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Throttles pose frames to a minimum interval.
///
/// A frame is accepted when at least `interval` has passed since the last
/// accepted frame. Rejection leaves the gate untouched.
#[derive(Debug, Clone)]
pub struct FrameGate {
    interval_ns: u64,
    last_accepted_ns: Option<u64>,
}

impl FrameGate {
    /// Create a gate with the given minimum interval.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval_ns: duration_to_ns(interval),
            last_accepted_ns: None,
        }
    }

    /// Create a gate from a millisecond interval.
    pub fn from_millis(interval_ms: u64) -> Self {
        Self::new(Duration::from_millis(interval_ms))
    }

    /// Decide whether the frame stamped `timestamp_ns` should be processed.
    /// Returns true and records the timestamp if accepted.
    /// The first call always returns true; timestamps earlier than the last
    /// accepted one are rejected.
    pub fn should_accept(&mut self, timestamp_ns: u64) -> bool {
        match self.last_accepted_ns {
            None => {
                self.last_accepted_ns = Some(timestamp_ns);
                true
            }
            Some(last) if timestamp_ns >= last && timestamp_ns - last >= self.interval_ns => {
                self.last_accepted_ns = Some(timestamp_ns);
                true
            }
            _ => false,
        }
    }

    /// Forget the last accepted frame so the next one is always accepted.
    pub fn reset(&mut self) {
        self.last_accepted_ns = None;
    }

    /// Timestamp of the last accepted frame.
    pub fn last_accepted_ns(&self) -> Option<u64> {
        self.last_accepted_ns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_duration_to_ns_saturates() {
        assert_eq!(duration_to_ns(Duration::from_millis(250)), 250_000_000);
        assert_eq!(duration_to_ns(Duration::from_secs(18_446_744_074)), u64::MAX);
        assert_eq!(duration_to_ns(Duration::MAX), u64::MAX);
    }

    #[test]
    fn test_huge_interval_gate_never_reopens() {
        let mut gate = FrameGate::new(Duration::from_secs(u64::MAX));
        assert!(gate.should_accept(0));
        assert!(!gate.should_accept(u64::MAX - 1));
    }

    #[test]
    fn test_clock_elapsed() {
        let clock = SessionClock::start();
        assert!(clock.elapsed_ns() < 1_000_000_000);
        assert!(clock.epoch_wall() <= Utc::now());
    }

    #[test]
    fn test_ns_to_secs_conversion() {
        assert!((SessionClock::ns_to_secs(1_500_000_000) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_gate_first_frame_always_accepted() {
        let mut gate = FrameGate::from_millis(250);
        assert!(gate.should_accept(42));
        assert_eq!(gate.last_accepted_ns(), Some(42));
    }

    #[test]
    fn test_gate_rejects_early_and_accepts_at_interval() {
        let mut gate = FrameGate::from_millis(250);
        assert!(gate.should_accept(0));
        assert!(!gate.should_accept(100_000_000)); // 100ms, too soon
        assert!(!gate.should_accept(249_999_999));
        assert!(gate.should_accept(250_000_000)); // exactly the interval
        assert!(!gate.should_accept(400_000_000));
        assert!(gate.should_accept(600_000_000));
    }

    #[test]
    fn test_gate_rejection_has_no_side_effects() {
        let mut gate = FrameGate::from_millis(100);
        assert!(gate.should_accept(1_000_000_000));
        assert!(!gate.should_accept(1_050_000_000));
        assert_eq!(gate.last_accepted_ns(), Some(1_000_000_000));
    }

    #[test]
    fn test_gate_rejects_timestamps_going_backwards() {
        let mut gate = FrameGate::from_millis(100);
        assert!(gate.should_accept(5_000_000_000));
        assert!(!gate.should_accept(1_000_000_000));
    }

    #[test]
    fn test_gate_reset() {
        let mut gate = FrameGate::from_millis(100);
        assert!(gate.should_accept(1_000_000_000));
        gate.reset();
        assert!(gate.should_accept(1_000_000_001));
    }

    proptest! {
        #[test]
        fn accepted_frames_are_spaced_by_interval(
            interval_ms in 1u64..500,
            deltas in proptest::collection::vec(0u64..600_000_000, 1..64),
        ) {
            let mut gate = FrameGate::from_millis(interval_ms);
            let mut t = 0u64;
            let mut accepted: Vec<u64> = Vec::new();
            for delta in deltas {
                t += delta;
                if gate.should_accept(t) {
                    accepted.push(t);
                }
            }
            for pair in accepted.windows(2) {
                prop_assert!(pair[1] - pair[0] >= interval_ms * 1_000_000);
            }
        }
    }
}
