//! Replay a recorded pose stream through the posture pipeline.

use std::path::PathBuf;

use posturemaxx_common::clock::SessionClock;
use posturemaxx_common::config::AppConfig;
use posturemaxx_pose_model::settings::{ClassifySource, GateSettings, PostureSettings};
use posturemaxx_session::{
    PostureSession, RecordedEstimator, ReplaySource, SessionEvent, SessionEventWriter,
};

/// Command-line overrides of the configured pipeline settings.
pub struct Overrides {
    pub interval_ms: Option<u64>,
    pub fast: bool,
    pub smoothed: bool,
    pub thresholds: Option<String>,
}

impl Overrides {
    fn apply(&self, settings: &mut PostureSettings) -> anyhow::Result<()> {
        if self.fast {
            settings.gate = GateSettings::fast();
        }
        if let Some(interval_ms) = self.interval_ms {
            settings.gate.interval_ms = interval_ms;
        }
        if self.smoothed {
            settings.classifier.source = ClassifySource::Smoothed;
        }
        if let Some(name) = &self.thresholds {
            settings.classifier.bad_bands = super::parse_threshold_preset(name)?.bands();
        }
        Ok(())
    }
}

pub async fn run(
    config: &AppConfig,
    path: PathBuf,
    output: Option<PathBuf>,
    overrides: Overrides,
    realtime: bool,
    all: bool,
) -> anyhow::Result<()> {
    println!("Replaying pose stream: {}", path.display());

    let mut settings = config.posture.clone();
    overrides.apply(&mut settings)?;

    let source = ReplaySource::open(&path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to open pose stream: {e}"))?
        .realtime(realtime);
    if let Some(header) = source.header() {
        println!("  Recorded at: {}", header.recorded_at.to_rfc3339());
    }
    println!("  Frames: {}", source.remaining());
    println!(
        "  Gate interval: {}ms, window: {}, source: {:?}",
        settings.gate.interval_ms, settings.smoothing.window_capacity, settings.classifier.source
    );

    let mut writer = output
        .as_ref()
        .map(|out| SessionEventWriter::create(out, &path.display().to_string()))
        .transpose()
        .map_err(|e| anyhow::anyhow!("Failed to create output: {e}"))?;

    let (session, mut events) = PostureSession::new(source, RecordedEstimator, &settings);
    let stop = session.stop_handle();
    let worker = tokio::spawn(session.run());

    println!();
    loop {
        tokio::select! {
            event = events.recv() => {
                let Some(event) = event else { break };
                print_event(&event, all);
                if let Some(writer) = writer.as_mut() {
                    writer.write_event(&event)?;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if stop.is_stopped() {
                    worker.abort();
                    anyhow::bail!("Interrupted again, aborting replay");
                }
                tracing::info!("Interrupt received, stopping session");
                stop.stop();
            }
        }
    }

    let summary = worker
        .await
        .map_err(|e| anyhow::anyhow!("Session task failed: {e}"))?
        .map_err(|e| anyhow::anyhow!("Session ended with error: {e}"))?;

    println!();
    println!("  Frames received:  {}", summary.frames_received);
    println!("  Frames processed: {}", summary.frames_processed);
    println!("  Frames throttled: {}", summary.frames_throttled);
    println!("  Alerts:           {}", summary.alerts);
    println!("  Last status:      {}", summary.last_status.text());

    if let Some(writer) = writer.as_mut() {
        writer.flush()?;
        println!(
            "  Events written to: {} ({} events)",
            writer.path().display(),
            writer.events_written()
        );
    }

    println!("\nReplay complete.");
    Ok(())
}

fn print_event(event: &SessionEvent, all: bool) {
    match event {
        SessionEvent::Update(update) => {
            if !all && !update.is_transition() {
                return;
            }
            let angle = update
                .neck_angle_deg
                .map(|a| format!(" (neck {a:.1} deg)"))
                .unwrap_or_default();
            println!(
                "  [{:>8.2}s] {:<8} -> {:<8} {}{}",
                SessionClock::ns_to_secs(update.timestamp_ns),
                update.previous_status.to_string(),
                update.status.to_string(),
                update.status.text(),
                angle
            );
        }
        SessionEvent::Alert(alert) => {
            println!(
                "  [{:>8.2}s] ALERT {}: {}",
                SessionClock::ns_to_secs(alert.timestamp_ns),
                alert.title,
                alert.body
            );
        }
        SessionEvent::Reset => println!("  Session reset"),
    }
}
