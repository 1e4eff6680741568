//! Tunable parameters for the posture pipeline.
//!
//! These are plain data; the processing crate turns them into runtime
//! components. Every section falls back to its defaults when omitted from a
//! config file.

use serde::{Deserialize, Serialize};

use crate::joint::{JointName, DEFAULT_MIN_CONFIDENCE};

/// All posture pipeline settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PostureSettings {
    pub gate: GateSettings,
    pub smoothing: SmoothingSettings,
    pub classifier: ClassifierSettings,
    pub alerts: AlertSettings,
}

/// Frame throttling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateSettings {
    /// Minimum time between processed frames (milliseconds).
    pub interval_ms: u64,
}

impl GateSettings {
    /// Default interval.
    pub const STANDARD_INTERVAL_MS: u64 = 250;
    /// Faster interval for responsive previews.
    pub const FAST_INTERVAL_MS: u64 = 100;

    pub fn fast() -> Self {
        Self {
            interval_ms: Self::FAST_INTERVAL_MS,
        }
    }
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            interval_ms: Self::STANDARD_INTERVAL_MS,
        }
    }
}

/// How samples in the smoothing window are averaged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmoothingWeighting {
    /// Plain arithmetic mean of confident samples.
    #[default]
    Uniform,
    /// Mean weighted by each sample's confidence.
    Confidence,
}

/// Joint smoothing window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingSettings {
    /// Number of frames kept in the window.
    pub window_capacity: usize,

    /// Samples at or below this confidence are ignored.
    pub min_confidence: f64,

    /// Joints kept in the window.
    pub tracked_joints: Vec<JointName>,

    pub weighting: SmoothingWeighting,
}

impl Default for SmoothingSettings {
    fn default() -> Self {
        Self {
            window_capacity: 5,
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            tracked_joints: vec![JointName::Neck, JointName::LeftShoulder],
            weighting: SmoothingWeighting::Uniform,
        }
    }
}

/// Which points the classifier sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifySource {
    /// The latest frame as estimated.
    #[default]
    Raw,
    /// The latest frame with tracked joints replaced by their smoothed points.
    Smoothed,
}

/// An open interval of neck angles, in degrees.
///
/// A missing bound is unbounded on that side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleBand {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub above: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub below: Option<f64>,
}

impl AngleBand {
    pub fn between(above: f64, below: f64) -> Self {
        Self {
            above: Some(above),
            below: Some(below),
        }
    }

    pub fn above(degrees: f64) -> Self {
        Self {
            above: Some(degrees),
            below: None,
        }
    }

    pub fn below(degrees: f64) -> Self {
        Self {
            above: None,
            below: Some(degrees),
        }
    }

    /// Whether `angle` lies strictly inside the band.
    pub fn contains(&self, angle: f64) -> bool {
        self.above.map_or(true, |lo| angle > lo) && self.below.map_or(true, |hi| angle < hi)
    }
}

/// Named threshold sets tried while tuning the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPreset {
    /// `> 100` or `< 70` degrees.
    SingleCutoff,
    /// `(100, 115)` or `< 68` degrees.
    Latest,
}

impl ThresholdPreset {
    pub fn bands(self) -> Vec<AngleBand> {
        match self {
            ThresholdPreset::SingleCutoff => vec![AngleBand::above(100.0), AngleBand::below(70.0)],
            ThresholdPreset::Latest => {
                vec![AngleBand::between(100.0, 115.0), AngleBand::below(68.0)]
            }
        }
    }
}

/// Posture classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierSettings {
    /// Required joints at or below this confidence count as missing.
    pub min_confidence: f64,

    /// Neck angles inside any band are classified as bad posture.
    pub bad_bands: Vec<AngleBand>,

    /// Shoulder-line tilt above this many degrees is bad posture. Off when `None`.
    pub max_shoulder_tilt_deg: Option<f64>,

    pub source: ClassifySource,
}

impl Default for ClassifierSettings {
    fn default() -> Self {
        Self {
            min_confidence: DEFAULT_MIN_CONFIDENCE,
            bad_bands: ThresholdPreset::Latest.bands(),
            max_shoulder_tilt_deg: None,
            source: ClassifySource::Raw,
        }
    }
}

/// Consumer-side alerting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlertSettings {
    /// Minimum time between two alerts (seconds).
    pub cooldown_secs: u64,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            cooldown_secs: 3600,
        }
    }
}
