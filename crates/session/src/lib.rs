//! PostureMaxx Session
//!
//! Runs the posture pipeline against a stream of captured frames. A session
//! owns the processor on a single worker; the consumer only ever sees
//! [`SessionEvent`]s delivered over a channel.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────── PostureSession (worker) ───────────────────────┐
//! │  FrameSource ──► FrameGate ──► PoseEstimator ──► Smoother ──► Classifier│
//! │                                                        │               │
//! │                                             AlertDebouncer             │
//! └────────────────────────────────────────────────────────┼───────────────┘
//!                                                          ▼
//!                                  mpsc channel ──► consumer (UI / notifier)
//! ```

pub mod session;
pub mod source;
pub mod writer;

pub use session::*;
pub use source::*;
pub use writer::SessionEventWriter;
