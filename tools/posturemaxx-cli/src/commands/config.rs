//! Show or initialize the configuration file.

use std::path::PathBuf;

use posturemaxx_common::config::{config_file_path, AppConfig};

pub fn run(
    config: &AppConfig,
    path: Option<PathBuf>,
    init: bool,
    force: bool,
) -> anyhow::Result<()> {
    let path = path.unwrap_or_else(config_file_path);

    if init {
        if path.exists() && !force {
            anyhow::bail!(
                "Config already exists at {} (use --force to overwrite)",
                path.display()
            );
        }
        AppConfig::default()
            .save_to(&path)
            .map_err(|e| anyhow::anyhow!("Failed to write config: {e}"))?;
        println!("Wrote default config to: {}", path.display());
        return Ok(());
    }

    println!("# {}", path.display());
    println!("{}", serde_json::to_string_pretty(config)?);
    Ok(())
}
