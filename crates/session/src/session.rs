//! Posture monitoring session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{mpsc, watch};

use posturemaxx_common::clock::SessionClock;
use posturemaxx_common::error::PostureResult;
use posturemaxx_core::alert::{AlertDebouncer, PostureAlert};
use posturemaxx_core::processor::{FrameOutcome, PoseEstimator, PostureProcessor, PostureUpdate};
use posturemaxx_pose_model::settings::PostureSettings;
use posturemaxx_pose_model::status::PostureStatus;

use crate::source::FrameSource;

/// Message handed from the session worker to the consumer.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A frame was processed.
    Update(PostureUpdate),
    /// The consumer should notify the user.
    Alert(PostureAlert),
    /// The session stopped; status is back to not-found and the window is empty.
    Reset,
}

/// Counters reported when a session ends.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub started_at: DateTime<Utc>,
    pub elapsed_secs: f64,
    pub frames_received: u64,
    pub frames_processed: u64,
    pub frames_throttled: u64,
    pub alerts: u64,
    /// Status of the last processed frame, before the closing reset.
    pub last_status: PostureStatus,
}

/// Runs the posture pipeline over a frame source on a single worker.
pub struct PostureSession<S, E> {
    source: S,
    estimator: E,
    processor: PostureProcessor,
    debouncer: AlertDebouncer,
    events: mpsc::UnboundedSender<SessionEvent>,
    stop_tx: Arc<watch::Sender<bool>>,
    stop_rx: watch::Receiver<bool>,
}

/// Requests that a running session end.
///
/// Stopping interrupts a source that is waiting for its next frame; the
/// session never processes a frame received after the request.
#[derive(Debug, Clone)]
pub struct SessionStopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl SessionStopHandle {
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_stopped(&self) -> bool {
        *self.tx.borrow()
    }
}

impl<S, E> PostureSession<S, E>
where
    S: FrameSource,
    E: PoseEstimator<Frame = S::Frame> + Send,
{
    /// Create a session and the receiving end of its event channel.
    pub fn new(
        source: S,
        estimator: E,
        settings: &PostureSettings,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = watch::channel(false);
        let session = Self {
            source,
            estimator,
            processor: PostureProcessor::new(settings),
            debouncer: AlertDebouncer::from_settings(&settings.alerts),
            events,
            stop_tx: Arc::new(stop_tx),
            stop_rx,
        };
        (session, receiver)
    }

    /// Handle that ends the session, including while it waits for a frame.
    pub fn stop_handle(&self) -> SessionStopHandle {
        SessionStopHandle {
            tx: self.stop_tx.clone(),
        }
    }

    /// Direct access to the processor, e.g. to register observers before
    /// the session starts.
    pub fn processor_mut(&mut self) -> &mut PostureProcessor {
        &mut self.processor
    }

    /// Process frames until the source is exhausted, a stop is requested,
    /// or the consumer hangs up.
    ///
    /// The processor is always reset on exit and a [`SessionEvent::Reset`]
    /// is sent. A source error ends the session and is returned after the
    /// reset.
    pub async fn run(mut self) -> PostureResult<SessionSummary> {
        let clock = SessionClock::start();
        tracing::info!(
            source = %self.source.name(),
            estimator = %self.estimator.name(),
            started_at = %clock.epoch_wall(),
            "Posture session started"
        );

        let mut frames_received = 0u64;
        let mut last_status = PostureStatus::NotFound;
        let mut failure = None;

        while !self.stop_requested() {
            let next = tokio::select! {
                biased;
                _ = stop_signal(&mut self.stop_rx) => break,
                next = self.source.next_frame() => next,
            };
            let frame = match next {
                Ok(Some(frame)) if self.stop_requested() => {
                    tracing::debug!(t = frame.timestamp_ns, "Dropping frame received after stop");
                    break;
                }
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Frame source failed");
                    failure = Some(e);
                    break;
                }
            };
            frames_received += 1;

            let FrameOutcome::Processed(update) =
                self.processor.process_frame(&frame, &mut self.estimator)
            else {
                continue;
            };
            last_status = update.status;

            let alert = self.debouncer.observe(&update);
            if !self.send(SessionEvent::Update(update)) {
                break;
            }
            if let Some(alert) = alert {
                if !self.send(SessionEvent::Alert(alert)) {
                    break;
                }
            }
        }

        self.processor.stop();
        self.debouncer.reset();
        self.send(SessionEvent::Reset);

        let summary = SessionSummary {
            started_at: clock.epoch_wall(),
            elapsed_secs: SessionClock::ns_to_secs(clock.elapsed_ns()),
            frames_received,
            frames_processed: self.processor.frames_processed(),
            frames_throttled: self.processor.frames_throttled(),
            alerts: self.debouncer.alerts_fired(),
            last_status,
        };

        tracing::info!(
            frames = summary.frames_received,
            processed = summary.frames_processed,
            alerts = summary.alerts,
            "Posture session stopped"
        );

        match failure {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    fn stop_requested(&self) -> bool {
        *self.stop_rx.borrow()
    }

    /// Returns false once the consumer has gone away.
    fn send(&self, event: SessionEvent) -> bool {
        if self.events.send(event).is_err() {
            tracing::debug!("Session consumer disconnected");
            return false;
        }
        true
    }
}

/// Resolves once a stop has been requested.
async fn stop_signal(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|stopped| *stopped).await.is_err() {
        // Sender is owned by the session, so this only happens during teardown.
        std::future::pending::<()>().await;
    }
}
