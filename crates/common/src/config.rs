//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use posturemaxx_pose_model::settings::PostureSettings;

use crate::error::{PostureError, PostureResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Posture pipeline parameters.
    pub posture: PostureSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "posturemaxx_core=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match serde_json::from_str::<AppConfig>(&content) {
                    Ok(config) => match config.validate() {
                        Ok(()) => return config,
                        Err(e) => {
                            tracing::warn!("Ignoring config at {:?}: {}", path, e);
                        }
                    },
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", path, e);
                }
            }
        }
        Self::default()
    }

    /// Reject settings the pipeline cannot run with.
    pub fn validate(&self) -> PostureResult<()> {
        let posture = &self.posture;

        if posture.smoothing.window_capacity == 0 {
            return Err(PostureError::config("smoothing.window_capacity must be at least 1"));
        }
        for (name, value) in [
            ("smoothing.min_confidence", posture.smoothing.min_confidence),
            ("classifier.min_confidence", posture.classifier.min_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(PostureError::config(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        for band in &posture.classifier.bad_bands {
            if let (Some(above), Some(below)) = (band.above, band.below) {
                if above >= below {
                    return Err(PostureError::config(format!(
                        "empty slouch band ({above}, {below})"
                    )));
                }
            }
        }
        if let Some(max) = posture.classifier.max_shoulder_tilt_deg {
            if !(0.0..=90.0).contains(&max) {
                return Err(PostureError::config(format!(
                    "classifier.max_shoulder_tilt_deg must be within [0, 90], got {max}"
                )));
            }
        }
        Ok(())
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let path = config_file_path();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(path, json)
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("posturemaxx").join("config.json")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("posturemaxx_test_{name}"));
        let _ = std::fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = scratch_dir("config_missing");
        let config = AppConfig::load_from(&dir.join("config.json"));
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = scratch_dir("config_save");
        let path = dir.join("nested").join("config.json");

        let mut config = AppConfig::default();
        config.posture.gate.interval_ms = 100;
        config.logging.json = true;
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_validate_rejects_unusable_settings() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.posture.smoothing.window_capacity = 0;
        assert!(matches!(config.validate(), Err(PostureError::Config { .. })));

        let mut config = AppConfig::default();
        config.posture.classifier.min_confidence = 1.5;
        assert!(matches!(config.validate(), Err(PostureError::Config { .. })));

        let mut config = AppConfig::default();
        config.posture.classifier.bad_bands =
            vec![posturemaxx_pose_model::settings::AngleBand::between(115.0, 100.0)];
        let err = config.validate().unwrap_err();
        assert_eq!(err.to_string(), "Configuration error: empty slouch band (115, 100)");
    }

    #[test]
    fn test_unusable_file_falls_back_to_defaults() {
        let dir = scratch_dir("config_unusable");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"posture":{"smoothing":{"window_capacity":0}}}"#).unwrap();

        assert_eq!(AppConfig::load_from(&path), AppConfig::default());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = scratch_dir("config_invalid");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(AppConfig::load_from(&path), AppConfig::default());

        std::fs::remove_dir_all(&dir).ok();
    }
}
