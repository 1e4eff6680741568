//! PostureMaxx Common Utilities
//!
//! Shared infrastructure for all PostureMaxx crates:
//! - Error types and result aliases
//! - Session clock and the frame gate that throttles pose processing
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
