//! Validate a recorded pose stream.

use std::path::PathBuf;

use posturemaxx_pose_model::frame::{parse_pose_stream, RecordedEstimate};

pub fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating pose stream at: {}", path.display());

    let content = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    let stream =
        parse_pose_stream(&content).map_err(|e| anyhow::anyhow!("Failed to parse stream: {e}"))?;

    match &stream.header {
        Some(header) => {
            println!("  Schema: {}", header.schema_version);
            println!("  Recorded at: {}", header.recorded_at.to_rfc3339());
            if let Some(source) = &header.source {
                println!("  Source: {source}");
            }
        }
        None => println!("  Header: none"),
    }

    let (mut detected, mut empty, mut failed) = (0usize, 0usize, 0usize);
    for frame in &stream.frames {
        match frame.estimate() {
            RecordedEstimate::Detected(_) => detected += 1,
            RecordedEstimate::NoPerson => empty += 1,
            RecordedEstimate::Failed(_) => failed += 1,
        }
    }

    let out_of_order = stream
        .frames
        .windows(2)
        .filter(|pair| pair[1].timestamp_ns < pair[0].timestamp_ns)
        .count();

    println!("  Frames: {}", stream.frames.len());
    println!("    with a person:   {detected}");
    println!("    without anyone:  {empty}");
    println!("    estimator error: {failed}");
    if let (Some(first), Some(last)) = (stream.frames.first(), stream.frames.last()) {
        println!(
            "  Duration: {:.2}s",
            last.timestamp_secs() - first.timestamp_secs()
        );
    }

    if out_of_order == 0 {
        println!("\nPose stream is valid.");
    } else {
        println!(
            "\n{out_of_order} frame(s) go back in time; the frame gate will drop them."
        );
    }

    Ok(())
}
