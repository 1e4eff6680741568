//! PostureMaxx Pose Model
//!
//! Defines the data contracts shared by every PostureMaxx crate:
//! - **Joints:** Named anatomical joints with a normalized location and confidence
//! - **Frames:** Per-frame pose snapshots and the recorded pose-stream format
//! - **Status:** The three-state posture classification and its presentation
//! - **Settings:** Tunable parameters for gating, smoothing, thresholds and alerts
//!
//! All joint coordinates are normalized to `[0.0, 1.0]` with the origin at
//! the bottom-left of the analyzed image.

pub mod frame;
pub mod joint;
pub mod settings;
pub mod status;

pub use frame::*;
pub use joint::*;
pub use settings::*;
pub use status::*;
