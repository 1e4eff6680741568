//! Error types shared across PostureMaxx crates.
//!
//! Nothing in the posture pipeline itself is fatal; these errors surface from
//! collaborators (estimators, frame sources, files) and are mapped to a
//! "nothing detected" status by the processor.

use std::path::PathBuf;

/// Top-level error type for PostureMaxx operations.
#[derive(Debug, thiserror::Error)]
pub enum PostureError {
    #[error("Pose estimation error: {message}")]
    Estimation { message: String },

    #[error("Pose stream error: {message}")]
    Stream { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using PostureError.
pub type PostureResult<T> = Result<T, PostureError>;

impl PostureError {
    pub fn estimation(msg: impl Into<String>) -> Self {
        Self::Estimation {
            message: msg.into(),
        }
    }

    pub fn stream(msg: impl Into<String>) -> Self {
        Self::Stream {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }
}

impl From<posturemaxx_pose_model::PoseStreamError> for PostureError {
    fn from(err: posturemaxx_pose_model::PoseStreamError) -> Self {
        Self::stream(err.to_string())
    }
}
