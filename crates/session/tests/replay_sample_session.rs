use std::path::PathBuf;

use posturemaxx_pose_model::settings::PostureSettings;
use posturemaxx_pose_model::status::PostureStatus;
use posturemaxx_session::{
    PostureSession, RecordedEstimator, ReplaySource, SessionEvent, SessionEventWriter,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
        .join("fixtures")
        .join("sample-session")
        .join("pose.jsonl")
}

async fn replay_fixture(settings: &PostureSettings) -> (Vec<SessionEvent>, u64) {
    let source = ReplaySource::open(&fixture_path())
        .await
        .expect("fixture should open");
    let (session, mut events) = PostureSession::new(source, RecordedEstimator, settings);
    let summary = session.run().await.expect("replay should succeed");

    let mut collected = Vec::new();
    while let Some(event) = events.recv().await {
        collected.push(event);
    }
    (collected, summary.frames_received)
}

#[tokio::test]
async fn replay_emits_updates_alerts_and_reset() {
    posturemaxx_common::logging::init_default_logging();

    let mut settings = PostureSettings::default();
    settings.alerts.cooldown_secs = 1;
    let (events, received) = replay_fixture(&settings).await;

    assert_eq!(received, 13);

    let updates: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Update(update) => Some(update.status),
            _ => None,
        })
        .collect();
    assert_eq!(updates.len(), 11);
    assert_eq!(updates.last(), Some(&PostureStatus::Good));

    let alerts: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            SessionEvent::Alert(alert) => Some(alert.timestamp_ns),
            _ => None,
        })
        .collect();
    assert_eq!(alerts, vec![500_000_000, 1_750_000_000]);

    assert_eq!(events.last(), Some(&SessionEvent::Reset));
}

#[tokio::test]
async fn replay_events_can_be_written_to_jsonl() {
    let (events, _) = replay_fixture(&PostureSettings::default()).await;

    let out = std::env::temp_dir().join(format!(
        "posturemaxx-replay-{}.jsonl",
        std::process::id()
    ));
    {
        let mut writer = SessionEventWriter::create(&out, "sample-session").unwrap();
        for event in &events {
            writer.write_event(event).unwrap();
        }
        assert_eq!(writer.events_written(), events.len() as u64);
    }

    let content = std::fs::read_to_string(&out).unwrap();
    let mut lines = content.lines();
    assert!(lines.next().unwrap().starts_with('#'));

    let records: Vec<serde_json::Value> = lines
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), events.len());
    assert_eq!(records[0]["type"], "update");
    assert_eq!(records[0]["status"], "good");
    assert_eq!(records.last().unwrap()["type"], "reset");

    let _ = std::fs::remove_file(&out);
}
