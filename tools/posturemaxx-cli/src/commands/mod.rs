pub mod angle;
pub mod config;
pub mod replay;
pub mod validate;

use posturemaxx_pose_model::settings::ThresholdPreset;

/// Parse a `--thresholds` value.
pub fn parse_threshold_preset(name: &str) -> anyhow::Result<ThresholdPreset> {
    match name.to_ascii_lowercase().as_str() {
        "latest" => Ok(ThresholdPreset::Latest),
        "single-cutoff" | "single_cutoff" => Ok(ThresholdPreset::SingleCutoff),
        other => anyhow::bail!("Unknown threshold preset '{other}' (expected latest|single-cutoff)"),
    }
}
