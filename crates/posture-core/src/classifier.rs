//! Posture classification from a single pose snapshot.
//!
//! The classifier is stateless: every call looks only at the snapshot it is
//! given. Debouncing status changes is up to the consumer.

use posturemaxx_pose_model::frame::FramePose;
use posturemaxx_pose_model::joint::JointName;
use posturemaxx_pose_model::settings::{AngleBand, ClassifierSettings};
use posturemaxx_pose_model::status::PostureStatus;

use crate::angle::{neck_angle, shoulder_tilt};

/// Classification result with the measurements behind it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PostureAssessment {
    pub status: PostureStatus,
    /// Neck angle in degrees, when it could be measured.
    pub neck_angle_deg: Option<f64>,
    /// Shoulder-line tilt in degrees, when it could be measured.
    pub shoulder_tilt_deg: Option<f64>,
}

impl PostureAssessment {
    fn not_found() -> Self {
        Self {
            status: PostureStatus::NotFound,
            neck_angle_deg: None,
            shoulder_tilt_deg: None,
        }
    }
}

/// Maps a pose snapshot to good/bad/not-found.
#[derive(Debug, Clone)]
pub struct PostureClassifier {
    min_confidence: f64,
    bad_bands: Vec<AngleBand>,
    max_shoulder_tilt_deg: Option<f64>,
}

impl PostureClassifier {
    pub fn new(settings: &ClassifierSettings) -> Self {
        Self {
            min_confidence: settings.min_confidence,
            bad_bands: settings.bad_bands.clone(),
            max_shoulder_tilt_deg: settings.max_shoulder_tilt_deg,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(&ClassifierSettings::default())
    }

    pub fn classify(&self, observation: Option<&FramePose>) -> PostureStatus {
        self.assess(observation).status
    }

    /// Classify and report the measured angles.
    pub fn assess(&self, observation: Option<&FramePose>) -> PostureAssessment {
        let Some(pose) = observation else {
            return PostureAssessment::not_found();
        };

        let confident = |joint| pose.confident(joint, self.min_confidence);
        let (Some(neck), Some(left_shoulder), Some(right_shoulder), Some(left_ear)) = (
            confident(JointName::Neck),
            confident(JointName::LeftShoulder),
            confident(JointName::RightShoulder),
            confident(JointName::LeftEar),
        ) else {
            return PostureAssessment::not_found();
        };

        let Some(angle) = neck_angle(neck.location, left_ear.location) else {
            tracing::debug!("Neck angle undefined for coincident neck and ear");
            return PostureAssessment::not_found();
        };
        let tilt = shoulder_tilt(left_shoulder.location, right_shoulder.location);

        let slouching = self.is_slouch_angle(angle);
        let leaning = match (self.max_shoulder_tilt_deg, tilt) {
            (Some(max), Some(tilt)) => tilt > max,
            _ => false,
        };

        PostureAssessment {
            status: if slouching || leaning {
                PostureStatus::Bad
            } else {
                PostureStatus::Good
            },
            neck_angle_deg: Some(angle),
            shoulder_tilt_deg: tilt,
        }
    }

    /// Whether a neck angle falls into any configured slouch band.
    pub fn is_slouch_angle(&self, angle_deg: f64) -> bool {
        self.bad_bands.iter().any(|band| band.contains(angle_deg))
    }
}

impl Default for PostureClassifier {
    fn default() -> Self {
        Self::with_defaults()
    }
}
