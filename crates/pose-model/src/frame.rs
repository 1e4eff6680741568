//! Per-frame pose snapshots and the recorded pose-stream format.
//!
//! A pose stream is JSONL: an optional `#`-prefixed header line followed by
//! one frame record per line. Each record carries the estimator output for
//! one captured frame, or the estimator failure for that frame.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::joint::{JointName, JointObservation};

/// Monotonic timestamp in nanoseconds since capture start.
pub type TimestampNs = u64;

/// Current pose-stream schema version.
pub const POSE_STREAM_SCHEMA_VERSION: &str = "1.0";

/// All joints detected for a single person in a single frame.
///
/// An empty snapshot means no person was detected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FramePose {
    joints: BTreeMap<JointName, JointObservation>,
}

impl FramePose {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, joint: JointName, observation: JointObservation) -> Self {
        self.joints.insert(joint, observation);
        self
    }

    pub fn insert(&mut self, joint: JointName, observation: JointObservation) {
        self.joints.insert(joint, observation);
    }

    pub fn get(&self, joint: JointName) -> Option<&JointObservation> {
        self.joints.get(&joint)
    }

    /// The joint, only if its confidence is strictly above `min_confidence`.
    pub fn confident(&self, joint: JointName, min_confidence: f64) -> Option<&JointObservation> {
        self.get(joint).filter(|obs| obs.is_confident(min_confidence))
    }

    /// A copy holding only the listed joints.
    pub fn restricted_to(&self, joints: &[JointName]) -> FramePose {
        let joints = self
            .joints
            .iter()
            .filter(|(name, _)| joints.contains(name))
            .map(|(name, obs)| (*name, *obs))
            .collect();
        FramePose { joints }
    }

    pub fn iter(&self) -> impl Iterator<Item = (JointName, &JointObservation)> {
        self.joints.iter().map(|(name, obs)| (*name, obs))
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }
}

impl FromIterator<(JointName, JointObservation)> for FramePose {
    fn from_iter<I: IntoIterator<Item = (JointName, JointObservation)>>(iter: I) -> Self {
        Self {
            joints: iter.into_iter().collect(),
        }
    }
}

/// Orientation hint handed to the estimator together with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ImageOrientation {
    #[default]
    Up,
    UpMirrored,
    Down,
    DownMirrored,
    Left,
    LeftMirrored,
    Right,
    RightMirrored,
}

/// Header line of a pose stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseStreamHeader {
    /// Schema version for forward compatibility.
    pub schema_version: String,

    /// Wall-clock time when recording started.
    pub recorded_at: DateTime<Utc>,

    /// Free-form description of the capture device or estimator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl PoseStreamHeader {
    pub fn new(source: Option<String>) -> Self {
        Self {
            schema_version: POSE_STREAM_SCHEMA_VERSION.to_string(),
            recorded_at: Utc::now(),
            source,
        }
    }
}

/// One recorded frame: what the estimator returned for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoseFrameRecord {
    /// Monotonic nanoseconds since capture start.
    #[serde(rename = "t")]
    pub timestamp_ns: TimestampNs,

    /// Orientation hint the frame was captured with.
    #[serde(default)]
    pub orientation: ImageOrientation,

    /// Estimated pose, absent when no person was detected.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<FramePose>,

    /// Estimator failure message; takes precedence over `pose`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Interpretation of a recorded frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecordedEstimate<'a> {
    Detected(&'a FramePose),
    NoPerson,
    Failed(&'a str),
}

impl PoseFrameRecord {
    /// A frame where a person was detected.
    pub fn detected(timestamp_ns: TimestampNs, pose: FramePose) -> Self {
        Self {
            timestamp_ns,
            orientation: ImageOrientation::Up,
            pose: Some(pose),
            error: None,
        }
    }

    /// A frame where nobody was detected.
    pub fn empty(timestamp_ns: TimestampNs) -> Self {
        Self {
            timestamp_ns,
            orientation: ImageOrientation::Up,
            pose: None,
            error: None,
        }
    }

    /// A frame on which the estimator failed.
    pub fn failed(timestamp_ns: TimestampNs, message: impl Into<String>) -> Self {
        Self {
            timestamp_ns,
            orientation: ImageOrientation::Up,
            pose: None,
            error: Some(message.into()),
        }
    }

    /// Timestamp as fractional seconds since capture start.
    pub fn timestamp_secs(&self) -> f64 {
        self.timestamp_ns as f64 / 1_000_000_000.0
    }

    pub fn estimate(&self) -> RecordedEstimate<'_> {
        if let Some(message) = &self.error {
            return RecordedEstimate::Failed(message);
        }
        match &self.pose {
            Some(pose) if !pose.is_empty() => RecordedEstimate::Detected(pose),
            _ => RecordedEstimate::NoPerson,
        }
    }
}

/// A parsed pose stream.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PoseStream {
    pub header: Option<PoseStreamHeader>,
    pub frames: Vec<PoseFrameRecord>,
}

/// Failure to parse a pose stream, with the 1-based line number.
#[derive(Debug, thiserror::Error)]
pub enum PoseStreamError {
    #[error("invalid header on line {line}: {source}")]
    Header {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid frame record on line {line}: {source}")]
    Record {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Parse a pose stream from JSONL content.
///
/// The first `#` line is read as the header; later `#` lines and blank
/// lines are ignored.
pub fn parse_pose_stream(jsonl: &str) -> Result<PoseStream, PoseStreamError> {
    let mut stream = PoseStream::default();
    let mut seen_record = false;

    for (idx, raw) in jsonl.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(comment) = line.strip_prefix('#') {
            if stream.header.is_none() && !seen_record {
                let header = serde_json::from_str(comment.trim())
                    .map_err(|source| PoseStreamError::Header { line: idx + 1, source })?;
                stream.header = Some(header);
            }
            continue;
        }

        let record = serde_json::from_str(line)
            .map_err(|source| PoseStreamError::Record { line: idx + 1, source })?;
        stream.frames.push(record);
        seen_record = true;
    }

    Ok(stream)
}

/// Serialize frame records to JSONL, without a header.
pub fn serialize_frames(frames: &[PoseFrameRecord]) -> Result<String, serde_json::Error> {
    let mut output = String::new();
    for frame in frames {
        output.push_str(&serde_json::to_string(frame)?);
        output.push('\n');
    }
    Ok(output)
}
