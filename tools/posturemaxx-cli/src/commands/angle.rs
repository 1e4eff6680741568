//! Compute and classify a single neck angle.

use posturemaxx_common::config::AppConfig;
use posturemaxx_core::angle::{neck_angle, VERTICAL_REFERENCE_OFFSET};
use posturemaxx_core::classifier::PostureClassifier;
use posturemaxx_pose_model::joint::Point2D;
use posturemaxx_pose_model::status::PostureStatus;

/// Parse `X,Y` into a coordinate pair.
pub fn parse_point(raw: &str) -> Result<(f64, f64), String> {
    let (x, y) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got '{raw}'"))?;
    let x = x
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid X '{x}': {e}"))?;
    let y = y
        .trim()
        .parse::<f64>()
        .map_err(|e| format!("invalid Y '{y}': {e}"))?;
    Ok((x, y))
}

pub fn run(
    config: &AppConfig,
    neck: (f64, f64),
    ear: (f64, f64),
    thresholds: Option<String>,
) -> anyhow::Result<()> {
    let mut settings = config.posture.classifier.clone();
    if let Some(name) = thresholds {
        settings.bad_bands = super::parse_threshold_preset(&name)?.bands();
    }
    let classifier = PostureClassifier::new(&settings);

    let neck = Point2D::new(neck.0, neck.1);
    let ear = Point2D::new(ear.0, ear.1);

    println!("Neck:      ({}, {})", neck.x, neck.y);
    println!("Ear:       ({}, {})", ear.x, ear.y);
    println!(
        "Reference: ({}, {})",
        neck.x,
        neck.y + VERTICAL_REFERENCE_OFFSET
    );

    let Some(angle) = neck_angle(neck, ear) else {
        println!("Angle:     undefined (neck and ear coincide)");
        println!("Status:    {}", PostureStatus::NotFound.text());
        return Ok(());
    };

    let status = if classifier.is_slouch_angle(angle) {
        PostureStatus::Bad
    } else {
        PostureStatus::Good
    };

    println!("Angle:     {angle:.2} deg");
    println!("Status:    {}", status.text());
    Ok(())
}
