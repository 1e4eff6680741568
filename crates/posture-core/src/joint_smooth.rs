//! Temporal smoothing of tracked joints.
//!
//! Keeps the last few pose snapshots in a fixed ring buffer and averages
//! each tracked joint over the samples whose confidence clears the
//! threshold. Joints are aggregated independently; a joint missing from a
//! frame is simply skipped for that frame.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use posturemaxx_pose_model::frame::FramePose;
use posturemaxx_pose_model::joint::{JointName, JointObservation, Point2D};
use posturemaxx_pose_model::settings::{SmoothingSettings, SmoothingWeighting};

/// One smoothed joint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothedJoint {
    /// Mean location over the contributing samples.
    pub location: Point2D,
    /// Mean confidence of the contributing samples.
    pub confidence: f64,
    /// Number of window frames that contributed.
    pub samples: usize,
}

/// Smoothed location per tracked joint. Never empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SmoothedPoints {
    joints: BTreeMap<JointName, SmoothedJoint>,
}

impl SmoothedPoints {
    pub fn get(&self, joint: JointName) -> Option<&SmoothedJoint> {
        self.joints.get(&joint)
    }

    pub fn iter(&self) -> impl Iterator<Item = (JointName, &SmoothedJoint)> {
        self.joints.iter().map(|(name, joint)| (*name, joint))
    }

    pub fn len(&self) -> usize {
        self.joints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.joints.is_empty()
    }

    /// Replace the joints of `frame` with their smoothed counterparts.
    pub fn overlay_onto(&self, frame: &FramePose) -> FramePose {
        let mut merged = frame.clone();
        for (name, joint) in self.iter() {
            merged.insert(
                name,
                JointObservation {
                    location: joint.location,
                    confidence: joint.confidence,
                },
            );
        }
        merged
    }
}

/// Fixed-capacity window of recent snapshots with per-joint averaging.
#[derive(Debug, Clone)]
pub struct JointSmoother {
    tracked: Vec<JointName>,
    min_confidence: f64,
    weighting: SmoothingWeighting,
    /// Ring storage; `head` is the oldest entry.
    slots: Vec<Option<FramePose>>,
    head: usize,
    len: usize,
}

impl JointSmoother {
    /// Create a smoother; a zero capacity is raised to one.
    pub fn new(
        tracked: Vec<JointName>,
        capacity: usize,
        min_confidence: f64,
        weighting: SmoothingWeighting,
    ) -> Self {
        let capacity = capacity.max(1);
        Self {
            tracked,
            min_confidence,
            weighting,
            slots: vec![None; capacity],
            head: 0,
            len: 0,
        }
    }

    pub fn from_settings(settings: &SmoothingSettings) -> Self {
        Self::new(
            settings.tracked_joints.clone(),
            settings.window_capacity,
            settings.min_confidence,
            settings.weighting,
        )
    }

    /// Append a snapshot, keeping only tracked joints and evicting the
    /// oldest entry when full.
    pub fn push(&mut self, snapshot: &FramePose) {
        let entry = snapshot.restricted_to(&self.tracked);
        let capacity = self.capacity();

        if self.len == capacity {
            self.slots[self.head] = Some(entry);
            self.head = (self.head + 1) % capacity;
        } else {
            let tail = (self.head + self.len) % capacity;
            self.slots[tail] = Some(entry);
            self.len += 1;
        }
    }

    /// Mean per tracked joint over confident samples, or `None` when no
    /// tracked joint has any confident sample.
    pub fn current_smoothed(&self) -> Option<SmoothedPoints> {
        let mut joints = BTreeMap::new();

        for &name in &self.tracked {
            let mut weight_sum = 0.0;
            let mut sum_x = 0.0;
            let mut sum_y = 0.0;
            let mut confidence_sum = 0.0;
            let mut samples = 0usize;

            for snapshot in self.iter() {
                let Some(obs) = snapshot.confident(name, self.min_confidence) else {
                    continue;
                };
                let weight = match self.weighting {
                    SmoothingWeighting::Uniform => 1.0,
                    SmoothingWeighting::Confidence => obs.confidence,
                };
                weight_sum += weight;
                sum_x += weight * obs.location.x;
                sum_y += weight * obs.location.y;
                confidence_sum += obs.confidence;
                samples += 1;
            }

            if samples == 0 {
                continue;
            }

            joints.insert(
                name,
                SmoothedJoint {
                    location: Point2D::new(sum_x / weight_sum, sum_y / weight_sum),
                    confidence: confidence_sum / samples as f64,
                    samples,
                },
            );
        }

        if joints.is_empty() {
            None
        } else {
            Some(SmoothedPoints { joints })
        }
    }

    /// Snapshots from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &FramePose> {
        let capacity = self.capacity();
        (0..self.len).filter_map(move |i| self.slots[(self.head + i) % capacity].as_ref())
    }

    /// Drop every snapshot.
    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn tracked_joints(&self) -> &[JointName] {
        &self.tracked
    }
}

impl Default for JointSmoother {
    fn default() -> Self {
        Self::from_settings(&SmoothingSettings::default())
    }
}
