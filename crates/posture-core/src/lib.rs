//! PostureMaxx Core: the posture pipeline.
//!
//! Turns noisy, intermittently missing per-frame pose estimates into a
//! posture status:
//! - **Frame Gate:** Drop frames arriving faster than the configured interval
//! - **Joint Smoothing:** Average tracked joints over a short ring-buffer window
//! - **Classification:** Neck angle against configurable slouch bands
//! - **Alerts:** Debounce `good -> bad` transitions for user notifications
//!
//! This crate is pure computation. Estimation is delegated to a
//! [`PoseEstimator`]; results are returned and pushed to observers.

pub mod alert;
pub mod angle;
pub mod classifier;
pub mod joint_smooth;
pub mod processor;

pub use alert::{AlertDebouncer, PostureAlert};
pub use classifier::{PostureAssessment, PostureClassifier};
pub use joint_smooth::{JointSmoother, SmoothedJoint, SmoothedPoints};
pub use processor::{
    CapturedFrame, FrameOutcome, PoseEstimator, PostureObserver, PostureProcessor, PostureUpdate,
};
