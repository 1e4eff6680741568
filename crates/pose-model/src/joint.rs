//! Joint names, points, and per-joint observations.
//!
//! All coordinates are normalized to `[0.0, 1.0]`.

use serde::{Deserialize, Serialize};

/// Confidence at or below which a joint is treated as not detected.
pub const DEFAULT_MIN_CONFIDENCE: f64 = 0.1;

/// A named joint of the body-pose model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JointName {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    Neck,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    Root,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl JointName {
    /// Every joint the estimator can report.
    pub const ALL: [JointName; 19] = [
        JointName::Nose,
        JointName::LeftEye,
        JointName::RightEye,
        JointName::LeftEar,
        JointName::RightEar,
        JointName::Neck,
        JointName::LeftShoulder,
        JointName::RightShoulder,
        JointName::LeftElbow,
        JointName::RightElbow,
        JointName::LeftWrist,
        JointName::RightWrist,
        JointName::Root,
        JointName::LeftHip,
        JointName::RightHip,
        JointName::LeftKnee,
        JointName::RightKnee,
        JointName::LeftAnkle,
        JointName::RightAnkle,
    ];

    /// Joints that must be confidently detected to classify posture.
    pub const POSTURE_REQUIRED: [JointName; 4] = [
        JointName::Neck,
        JointName::LeftShoulder,
        JointName::RightShoulder,
        JointName::LeftEar,
    ];

    /// The camelCase name used in pose streams and config files.
    pub fn as_str(&self) -> &'static str {
        match self {
            JointName::Nose => "nose",
            JointName::LeftEye => "leftEye",
            JointName::RightEye => "rightEye",
            JointName::LeftEar => "leftEar",
            JointName::RightEar => "rightEar",
            JointName::Neck => "neck",
            JointName::LeftShoulder => "leftShoulder",
            JointName::RightShoulder => "rightShoulder",
            JointName::LeftElbow => "leftElbow",
            JointName::RightElbow => "rightElbow",
            JointName::LeftWrist => "leftWrist",
            JointName::RightWrist => "rightWrist",
            JointName::Root => "root",
            JointName::LeftHip => "leftHip",
            JointName::RightHip => "rightHip",
            JointName::LeftKnee => "leftKnee",
            JointName::RightKnee => "rightKnee",
            JointName::LeftAnkle => "leftAnkle",
            JointName::RightAnkle => "rightAnkle",
        }
    }
}

impl std::fmt::Display for JointName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A 2D point in normalized image space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point translated by `(dx, dy)`.
    pub fn offset(&self, dx: f64, dy: f64) -> Point2D {
        Point2D::new(self.x + dx, self.y + dy)
    }
}

/// One joint as reported by the pose estimator for a single frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JointObservation {
    /// Normalized location, origin bottom-left.
    #[serde(flatten)]
    pub location: Point2D,

    /// Estimator confidence in `[0.0, 1.0]`.
    pub confidence: f64,
}

impl JointObservation {
    pub fn new(x: f64, y: f64, confidence: f64) -> Self {
        Self {
            location: Point2D::new(x, y),
            confidence,
        }
    }

    /// Whether the confidence is strictly above `min_confidence`.
    pub fn is_confident(&self, min_confidence: f64) -> bool {
        self.confidence > min_confidence
    }
}
