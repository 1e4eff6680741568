//! Frame sources and the recorded-estimate estimator.
//!
//! Live capture and on-device pose estimation live outside this workspace.
//! [`ReplaySource`] stands in for the capture device by replaying a recorded
//! pose stream, and [`RecordedEstimator`] returns the estimate stored with
//! each replayed frame.

use std::collections::VecDeque;
use std::path::Path;
use std::time::Duration;

use posturemaxx_common::error::{PostureError, PostureResult};
use posturemaxx_core::processor::{CapturedFrame, PoseEstimator};
use posturemaxx_pose_model::frame::{
    parse_pose_stream, FramePose, ImageOrientation, PoseFrameRecord, PoseStream,
    PoseStreamHeader, RecordedEstimate,
};

/// Delivers captured frames to a session.
#[async_trait::async_trait]
pub trait FrameSource: Send {
    /// Frame buffer type produced by this source.
    type Frame: Send;

    /// Wait for the next frame. Returns `None` once the source is exhausted.
    async fn next_frame(&mut self) -> PostureResult<Option<CapturedFrame<Self::Frame>>>;

    /// Source name for logging.
    fn name(&self) -> &str;
}

/// Replays a recorded pose stream.
pub struct ReplaySource {
    name: String,
    header: Option<PoseStreamHeader>,
    frames: VecDeque<PoseFrameRecord>,
    realtime: bool,
    started: Option<(tokio::time::Instant, u64)>,
}

impl ReplaySource {
    pub fn new(name: impl Into<String>, stream: PoseStream) -> Self {
        Self {
            name: name.into(),
            header: stream.header,
            frames: stream.frames.into(),
            realtime: false,
            started: None,
        }
    }

    /// Load a pose stream from a JSONL file.
    pub async fn open(path: &Path) -> PostureResult<Self> {
        if !path.exists() {
            return Err(PostureError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        let content = tokio::fs::read_to_string(path).await?;
        let stream = parse_pose_stream(&content)?;
        tracing::info!(
            path = %path.display(),
            frames = stream.frames.len(),
            "Loaded pose stream"
        );
        Ok(Self::new(path.display().to_string(), stream))
    }

    /// Pace frames by their recorded timestamps instead of replaying at once.
    pub fn realtime(mut self, realtime: bool) -> Self {
        self.realtime = realtime;
        self
    }

    pub fn header(&self) -> Option<&PoseStreamHeader> {
        self.header.as_ref()
    }

    /// Frames not yet delivered.
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

#[async_trait::async_trait]
impl FrameSource for ReplaySource {
    type Frame = PoseFrameRecord;

    async fn next_frame(&mut self) -> PostureResult<Option<CapturedFrame<PoseFrameRecord>>> {
        let Some(record) = self.frames.pop_front() else {
            return Ok(None);
        };

        if self.realtime {
            let (start, first_ns) = *self
                .started
                .get_or_insert_with(|| (tokio::time::Instant::now(), record.timestamp_ns));
            let offset = Duration::from_nanos(record.timestamp_ns.saturating_sub(first_ns));
            tokio::time::sleep_until(start + offset).await;
        }

        Ok(Some(CapturedFrame::new(
            record.timestamp_ns,
            record.orientation,
            record,
        )))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Estimator that returns the estimate recorded alongside each frame.
#[derive(Debug, Default)]
pub struct RecordedEstimator;

impl PoseEstimator for RecordedEstimator {
    type Frame = PoseFrameRecord;

    fn estimate(
        &mut self,
        frame: &PoseFrameRecord,
        _orientation: ImageOrientation,
    ) -> PostureResult<Option<FramePose>> {
        match frame.estimate() {
            RecordedEstimate::Detected(pose) => Ok(Some(pose.clone())),
            RecordedEstimate::NoPerson => Ok(None),
            RecordedEstimate::Failed(message) => Err(PostureError::estimation(message)),
        }
    }

    fn name(&self) -> &str {
        "recorded"
    }
}
