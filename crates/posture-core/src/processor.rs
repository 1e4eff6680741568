//! The per-frame posture pipeline.
//!
//! A [`PostureProcessor`] owns the frame gate, the smoothing window, the
//! classifier and the current status. It is meant to be owned by the worker
//! that receives frames; only [`PostureUpdate`] values leave it, either as
//! the return value of [`PostureProcessor::process_frame`] or through
//! registered [`PostureObserver`]s.

use serde::Serialize;

use posturemaxx_common::clock::FrameGate;
use posturemaxx_common::error::PostureResult;
use posturemaxx_pose_model::frame::{FramePose, ImageOrientation, TimestampNs};
use posturemaxx_pose_model::settings::{ClassifySource, PostureSettings};
use posturemaxx_pose_model::status::PostureStatus;

use crate::classifier::PostureClassifier;
use crate::joint_smooth::{JointSmoother, SmoothedPoints};

/// External body-pose estimator.
pub trait PoseEstimator {
    /// Frame buffer type the estimator consumes.
    type Frame;

    /// Estimate the pose of at most one person in `frame`.
    ///
    /// `Ok(None)` means nobody was found. Errors are treated the same way
    /// by the processor.
    fn estimate(
        &mut self,
        frame: &Self::Frame,
        orientation: ImageOrientation,
    ) -> PostureResult<Option<FramePose>>;

    /// Estimator name for logging.
    fn name(&self) -> &str;
}

/// A captured video frame and its metadata.
#[derive(Debug, Clone)]
pub struct CapturedFrame<F> {
    /// Monotonic nanoseconds since capture start.
    pub timestamp_ns: TimestampNs,
    pub orientation: ImageOrientation,
    pub buffer: F,
}

impl<F> CapturedFrame<F> {
    pub fn new(timestamp_ns: TimestampNs, orientation: ImageOrientation, buffer: F) -> Self {
        Self {
            timestamp_ns,
            orientation,
            buffer,
        }
    }
}

/// Result of one processed frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PostureUpdate {
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,
    pub status: PostureStatus,
    pub previous_status: PostureStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neck_angle_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shoulder_tilt_deg: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoothed: Option<SmoothedPoints>,
}

impl PostureUpdate {
    /// Whether the status changed on this frame.
    pub fn is_transition(&self) -> bool {
        self.status != self.previous_status
    }
}

/// What happened to a frame handed to the processor.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    /// Dropped by the frame gate; the estimator was not called.
    Throttled,
    Processed(PostureUpdate),
}

impl FrameOutcome {
    pub fn update(&self) -> Option<&PostureUpdate> {
        match self {
            FrameOutcome::Processed(update) => Some(update),
            FrameOutcome::Throttled => None,
        }
    }
}

/// Receives results from a [`PostureProcessor`].
pub trait PostureObserver: Send {
    /// Called for every processed frame.
    fn on_update(&mut self, update: &PostureUpdate);

    /// Called after the processor was stopped and its state cleared.
    fn on_reset(&mut self) {}
}

/// Gate, smoothing window, classifier and current status.
pub struct PostureProcessor {
    gate: FrameGate,
    smoother: JointSmoother,
    classifier: PostureClassifier,
    source: ClassifySource,
    status: PostureStatus,
    observers: Vec<Box<dyn PostureObserver>>,
    frames_processed: u64,
    frames_throttled: u64,
}

impl PostureProcessor {
    pub fn new(settings: &PostureSettings) -> Self {
        Self {
            gate: FrameGate::from_millis(settings.gate.interval_ms),
            smoother: JointSmoother::from_settings(&settings.smoothing),
            classifier: PostureClassifier::new(&settings.classifier),
            source: settings.classifier.source,
            status: PostureStatus::NotFound,
            observers: Vec::new(),
            frames_processed: 0,
            frames_throttled: 0,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&PostureSettings::default())
    }

    /// Register an observer for every subsequent update and reset.
    pub fn subscribe(&mut self, observer: Box<dyn PostureObserver>) {
        self.observers.push(observer);
    }

    /// Gate, estimate, smooth and classify one frame.
    pub fn process_frame<E: PoseEstimator>(
        &mut self,
        frame: &CapturedFrame<E::Frame>,
        estimator: &mut E,
    ) -> FrameOutcome {
        if !self.gate.should_accept(frame.timestamp_ns) {
            self.frames_throttled += 1;
            return FrameOutcome::Throttled;
        }

        let observation = match estimator.estimate(&frame.buffer, frame.orientation) {
            Ok(observation) => observation,
            Err(e) => {
                tracing::warn!(
                    estimator = %estimator.name(),
                    t = frame.timestamp_ns,
                    error = %e,
                    "Pose estimation failed"
                );
                None
            }
        };

        FrameOutcome::Processed(self.apply_observation(frame.timestamp_ns, observation))
    }

    fn apply_observation(
        &mut self,
        timestamp_ns: TimestampNs,
        observation: Option<FramePose>,
    ) -> PostureUpdate {
        self.smoother.push(observation.as_ref().unwrap_or(&FramePose::new()));
        let smoothed = self.smoother.current_smoothed();

        let classified = match (self.source, smoothed.as_ref()) {
            (ClassifySource::Smoothed, Some(points)) => {
                observation.as_ref().map(|raw| points.overlay_onto(raw))
            }
            _ => observation,
        };
        let assessment = self.classifier.assess(classified.as_ref());

        let previous_status = self.status;
        self.status = assessment.status;
        self.frames_processed += 1;

        if previous_status != self.status {
            tracing::debug!(
                t = timestamp_ns,
                from = %previous_status,
                to = %self.status,
                neck_angle = ?assessment.neck_angle_deg,
                "Posture status changed"
            );
        }

        let update = PostureUpdate {
            timestamp_ns,
            status: assessment.status,
            previous_status,
            neck_angle_deg: assessment.neck_angle_deg,
            shoulder_tilt_deg: assessment.shoulder_tilt_deg,
            smoothed,
        };

        for observer in &mut self.observers {
            observer.on_update(&update);
        }

        update
    }

    /// Clear the window, reset status to not-found and reopen the gate.
    pub fn stop(&mut self) {
        self.smoother.clear();
        self.gate.reset();
        self.status = PostureStatus::NotFound;

        tracing::debug!(
            processed = self.frames_processed,
            throttled = self.frames_throttled,
            "Posture processor reset"
        );

        for observer in &mut self.observers {
            observer.on_reset();
        }
    }

    pub fn status(&self) -> PostureStatus {
        self.status
    }

    pub fn smoother(&self) -> &JointSmoother {
        &self.smoother
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    pub fn frames_throttled(&self) -> u64 {
        self.frames_throttled
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use posturemaxx_common::error::PostureError;
    use posturemaxx_pose_model::joint::{JointName, JointObservation};

    use super::*;

    /// Estimator that returns whatever the frame buffer holds.
    struct ScriptedEstimator {
        calls: usize,
    }

    impl PoseEstimator for ScriptedEstimator {
        type Frame = Scripted;

        fn estimate(
            &mut self,
            frame: &Self::Frame,
            _orientation: ImageOrientation,
        ) -> PostureResult<Option<FramePose>> {
            self.calls += 1;
            frame.clone().map_err(PostureError::estimation)
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    #[derive(Default)]
    struct Recorded {
        updates: Vec<PostureUpdate>,
        resets: usize,
    }

    struct RecordingObserver(Arc<Mutex<Recorded>>);

    impl PostureObserver for RecordingObserver {
        fn on_update(&mut self, update: &PostureUpdate) {
            self.0.lock().unwrap().updates.push(update.clone());
        }

        fn on_reset(&mut self) {
            self.0.lock().unwrap().resets += 1;
        }
    }

    fn pose(ear_x: f64, ear_y: f64) -> FramePose {
        FramePose::new()
            .with(JointName::Neck, JointObservation::new(0.5, 0.5, 0.9))
            .with(JointName::LeftShoulder, JointObservation::new(0.65, 0.48, 0.9))
            .with(JointName::RightShoulder, JointObservation::new(0.35, 0.48, 0.9))
            .with(JointName::LeftEar, JointObservation::new(ear_x, ear_y, 0.9))
    }

    fn good_pose() -> FramePose {
        // 90 degrees
        pose(0.7, 0.5)
    }

    fn bad_pose() -> FramePose {
        // ~108 degrees, inside the (100, 115) band
        let rad = 108f64.to_radians();
        pose(0.5 + 0.2 * rad.sin(), 0.5 - 0.2 * rad.cos())
    }

    type Scripted = Result<Option<FramePose>, String>;

    fn frame(t_ms: u64, estimate: Scripted) -> CapturedFrame<Scripted> {
        CapturedFrame::new(t_ms * 1_000_000, ImageOrientation::Up, estimate)
    }

    #[test]
    fn test_initial_status_is_not_found() {
        let processor = PostureProcessor::with_defaults();
        assert_eq!(processor.status(), PostureStatus::NotFound);
        assert!(processor.smoother().is_empty());
    }

    #[test]
    fn test_throttled_frames_skip_estimator() {
        let mut processor = PostureProcessor::with_defaults();
        let mut estimator = ScriptedEstimator { calls: 0 };

        let first = processor.process_frame(&frame(0, Ok(Some(good_pose()))), &mut estimator);
        assert!(first.update().is_some());

        let second = processor.process_frame(&frame(100, Ok(Some(bad_pose()))), &mut estimator);
        assert_eq!(second, FrameOutcome::Throttled);
        assert_eq!(estimator.calls, 1);
        assert_eq!(processor.status(), PostureStatus::Good);
        assert_eq!(processor.frames_throttled(), 1);

        let third = processor.process_frame(&frame(250, Ok(Some(bad_pose()))), &mut estimator);
        assert_eq!(third.update().unwrap().status, PostureStatus::Bad);
        assert_eq!(estimator.calls, 2);
    }

    #[test]
    fn test_estimation_error_maps_to_not_found() {
        let mut processor = PostureProcessor::with_defaults();
        let mut estimator = ScriptedEstimator { calls: 0 };

        processor.process_frame(&frame(0, Ok(Some(good_pose()))), &mut estimator);
        let failed = frame(300, Err("handler failed".into()));
        let outcome = processor.process_frame(&failed, &mut estimator);

        let update = outcome.update().unwrap();
        assert_eq!(update.status, PostureStatus::NotFound);
        assert_eq!(update.previous_status, PostureStatus::Good);
        assert!(update.is_transition());
        // Window still holds the earlier confident neck.
        assert!(update.smoothed.is_some());
        assert_eq!(processor.smoother().len(), 2);
    }

    #[test]
    fn test_observers_receive_updates_and_reset() {
        let recorded = Arc::new(Mutex::new(Recorded::default()));
        let mut processor = PostureProcessor::with_defaults();
        processor.subscribe(Box::new(RecordingObserver(recorded.clone())));
        let mut estimator = ScriptedEstimator { calls: 0 };

        processor.process_frame(&frame(0, Ok(Some(good_pose()))), &mut estimator);
        processor.process_frame(&frame(50, Ok(Some(good_pose()))), &mut estimator);
        processor.process_frame(&frame(500, Ok(None)), &mut estimator);
        processor.stop();

        let recorded = recorded.lock().unwrap();
        assert_eq!(recorded.updates.len(), 2);
        assert_eq!(recorded.updates[0].status, PostureStatus::Good);
        assert_eq!(recorded.updates[1].status, PostureStatus::NotFound);
        assert_eq!(recorded.resets, 1);
    }

    #[test]
    fn test_stop_clears_window_and_status() {
        let mut processor = PostureProcessor::with_defaults();
        let mut estimator = ScriptedEstimator { calls: 0 };

        processor.process_frame(&frame(0, Ok(Some(bad_pose()))), &mut estimator);
        assert_eq!(processor.status(), PostureStatus::Bad);

        processor.stop();
        assert_eq!(processor.status(), PostureStatus::NotFound);
        assert!(processor.smoother().is_empty());

        // The gate is reopened, so a restart at an earlier clock is accepted.
        let outcome = processor.process_frame(&frame(0, Ok(Some(good_pose()))), &mut estimator);
        assert_eq!(outcome.update().unwrap().previous_status, PostureStatus::NotFound);
    }

    #[test]
    fn test_smoothed_source_classifies_with_window_mean() {
        let mut settings = PostureSettings::default();
        settings.gate.interval_ms = 0;
        settings.classifier.source = ClassifySource::Smoothed;
        let mut processor = PostureProcessor::new(&settings);
        let mut estimator = ScriptedEstimator { calls: 0 };

        // Neck jitters between two positions; the ear stays put at the
        // smoothed neck's horizontal, which is 90 degrees only after averaging.
        let jitter = |neck_y: f64| {
            FramePose::new()
                .with(JointName::Neck, JointObservation::new(0.5, neck_y, 0.9))
                .with(JointName::LeftShoulder, JointObservation::new(0.65, 0.48, 0.9))
                .with(JointName::RightShoulder, JointObservation::new(0.35, 0.48, 0.9))
                .with(JointName::LeftEar, JointObservation::new(0.7, 0.5, 0.9))
        };

        processor.process_frame(&frame(0, Ok(Some(jitter(0.45)))), &mut estimator);
        let outcome = processor.process_frame(&frame(1, Ok(Some(jitter(0.55)))), &mut estimator);

        let update = outcome.update().unwrap();
        assert!((update.neck_angle_deg.unwrap() - 90.0).abs() < 1e-6);
        let neck = update.smoothed.as_ref().unwrap().get(JointName::Neck).unwrap();
        assert!((neck.location.y - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_update_serializes_compactly() {
        let update = PostureUpdate {
            timestamp_ns: 1_000,
            status: PostureStatus::NotFound,
            previous_status: PostureStatus::Good,
            neck_angle_deg: None,
            shoulder_tilt_deg: None,
            smoothed: None,
        };
        let json = serde_json::to_string(&update).unwrap();
        assert_eq!(
            json,
            r#"{"t":1000,"status":"notFound","previous_status":"good"}"#
        );
    }
}
