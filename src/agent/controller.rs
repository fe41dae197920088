use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::{mpsc, oneshot};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::audio::{AudioChunk, AudioFrame, CaptureBackend};
use crate::bus::{AgentEvent, AgentSide, ControlCommand, PersistRequest};

/// Lifecycle states of the recording controller.
///
/// `Idle → Recording → Finalizing → Idle` for the rotation loop, with
/// `ShuttingDown → Terminated` reachable from any recording state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Recording,
    Finalizing,
    ShuttingDown,
    Terminated,
}

/// One live recording session. Created on a start command, destroyed when
/// the session drains; the interval of a running session never changes.
#[derive(Debug)]
struct RecordingSession {
    session_id: Uuid,
    started_at: DateTime<Local>,
    interval_ms: u64,
}

impl RecordingSession {
    fn new(interval_ms: u64) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            started_at: Local::now(),
            interval_ms,
        }
    }
}

/// How a session ended, deciding the controller's next state.
enum SessionEnd {
    /// Interval update: drain done, restart with the new interval.
    Restart { interval_ms: u64 },
    /// Stop-before-quit handled; final chunk persisted.
    Shutdown,
    /// The capture stream died; fall back to idle.
    DeviceLost,
    /// The orchestrator went away; nothing left to do.
    BusClosed,
}

/// The recording state machine.
///
/// Owns the capture device (through a `CaptureBackend`) and the rotation
/// timer. Every `interval_ms` the active chunk is closed, encoded, and
/// handed to the orchestrator for persistence; the next chunk opens
/// immediately, so capture is gapless even though persistence is segmented.
pub struct RecordingController {
    backend: Box<dyn CaptureBackend>,
    control_rx: mpsc::Receiver<ControlCommand>,
    events_tx: mpsc::Sender<AgentEvent>,
    state: ControllerState,
}

impl RecordingController {
    pub fn new(backend: Box<dyn CaptureBackend>, side: AgentSide) -> Self {
        Self {
            backend,
            control_rx: side.control_rx,
            events_tx: side.events_tx,
            state: ControllerState::Idle,
        }
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Run the controller until it terminates.
    pub async fn run(mut self) {
        info!("Recording controller started ({})", self.backend.name());

        while self.state != ControllerState::Terminated {
            let cmd = match self.control_rx.recv().await {
                Some(cmd) => cmd,
                None => break,
            };

            match cmd {
                ControlCommand::Start { interval_ms }
                | ControlCommand::UpdateInterval { interval_ms } => {
                    let mut next_interval = Some(interval_ms);
                    while let Some(interval_ms) = next_interval.take() {
                        next_interval = self.run_session(interval_ms).await;
                    }
                }
                ControlCommand::StopBeforeQuit => {
                    // Idle: no chunk in flight, acknowledge immediately.
                    self.state = ControllerState::ShuttingDown;
                    let _ = self.events_tx.send(AgentEvent::FinalSaveCompleted).await;
                    self.state = ControllerState::Terminated;
                }
            }
        }

        self.state = ControllerState::Terminated;
        info!("Recording controller terminated");
    }

    /// Acquire the device and run one session to completion.
    /// Returns the new interval when the session should restart.
    async fn run_session(&mut self, interval_ms: u64) -> Option<u64> {
        let frames = match self.backend.start().await {
            Ok(frames) => frames,
            Err(e) => {
                warn!("Failed to start capture: {}", e);
                self.send_status(format!("Recording error: {e}")).await;
                self.state = ControllerState::Idle;
                return None;
            }
        };

        let session = RecordingSession::new(interval_ms);
        self.state = ControllerState::Recording;
        info!(
            "Session {} started at {} ({}ms chunks)",
            session.session_id,
            session.started_at.format("%H:%M:%S"),
            session.interval_ms
        );
        self.send_status(format!(
            "Recording (save every {} seconds)",
            interval_ms / 1000
        ))
        .await;

        let end = self.capture_loop(frames, &session).await;

        // The device is released on every exit path; it cannot be
        // reacquired until this completes.
        if let Err(e) = self.backend.stop().await {
            warn!("Failed to stop capture backend: {}", e);
        }

        match end {
            SessionEnd::Restart { interval_ms } => Some(interval_ms),
            SessionEnd::Shutdown => {
                let _ = self.events_tx.send(AgentEvent::FinalSaveCompleted).await;
                self.state = ControllerState::Terminated;
                None
            }
            SessionEnd::DeviceLost => {
                self.state = ControllerState::Idle;
                None
            }
            SessionEnd::BusClosed => {
                self.state = ControllerState::Terminated;
                None
            }
        }
    }

    /// The rotation loop: frames accumulate into the active chunk until the
    /// timer cuts a boundary or a control command ends the session.
    async fn capture_loop(
        &mut self,
        mut frames: mpsc::Receiver<AudioFrame>,
        session: &RecordingSession,
    ) -> SessionEnd {
        let interval = Duration::from_millis(session.interval_ms);
        let mut rotation = interval_at(Instant::now() + interval, interval);
        rotation.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut chunk = AudioChunk::new();

        loop {
            tokio::select! {
                _ = rotation.tick() => {
                    self.state = ControllerState::Finalizing;
                    self.rotate(&mut chunk, session).await;
                    self.state = ControllerState::Recording;
                }

                frame = frames.recv() => match frame {
                    Some(frame) => chunk.push_frame(&frame),
                    None => {
                        warn!("Session {}: capture stream ended unexpectedly", session.session_id);
                        self.send_status("Recording stopped: capture device lost".to_string())
                            .await;
                        return SessionEnd::DeviceLost;
                    }
                },

                cmd = self.control_rx.recv() => match cmd {
                    Some(ControlCommand::Start { interval_ms })
                    | Some(ControlCommand::UpdateInterval { interval_ms }) => {
                        info!(
                            "Session {}: interval update to {}ms, draining current chunk",
                            session.session_id, interval_ms
                        );
                        self.rotate(&mut chunk, session).await;
                        return SessionEnd::Restart { interval_ms };
                    }
                    Some(ControlCommand::StopBeforeQuit) => {
                        self.state = ControllerState::ShuttingDown;
                        self.persist_final(std::mem::take(&mut chunk), session).await;
                        return SessionEnd::Shutdown;
                    }
                    None => {
                        warn!("Control channel closed while recording");
                        return SessionEnd::BusClosed;
                    }
                },
            }
        }
    }

    /// Close the active chunk and hand it off for persistence without
    /// waiting for the outcome; the reply is forwarded as a status update
    /// from a watcher task so the next chunk opens immediately.
    async fn rotate(&mut self, chunk: &mut AudioChunk, session: &RecordingSession) {
        let closed = std::mem::take(chunk);

        if closed.is_empty() {
            debug!(
                "Session {}: empty chunk at rotation boundary, skipping",
                session.session_id
            );
            return;
        }

        info!(
            "Session {}: chunk boundary, {} samples spanning {}ms",
            session.session_id,
            closed.sample_count(),
            closed.span_ms()
        );

        let bytes = match closed.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Session {}: dropping chunk: {}", session.session_id, e);
                self.send_status(format!("Encode error: {e}")).await;
                return;
            }
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let request = PersistRequest {
            bytes,
            reply: reply_tx,
        };

        if self
            .events_tx
            .send(AgentEvent::Persist(request))
            .await
            .is_err()
        {
            warn!("Persistence channel closed; chunk dropped");
            return;
        }

        let events_tx = self.events_tx.clone();
        tokio::spawn(async move {
            let status = match reply_rx.await {
                Ok(outcome) if outcome.success => {
                    format!("Auto saved: {}", outcome.filename.unwrap_or_default())
                }
                Ok(outcome) => {
                    format!("Save error: {}", outcome.error.unwrap_or_default())
                }
                Err(_) => "Save error: no response from writer".to_string(),
            };
            let _ = events_tx.send(AgentEvent::Status(status)).await;
        });
    }

    /// Persist the final chunk of a shutdown, awaiting the outcome so the
    /// acknowledgment is only sent once the write has actually finished.
    async fn persist_final(&mut self, chunk: AudioChunk, session: &RecordingSession) {
        if chunk.is_empty() {
            debug!(
                "Session {}: no samples in final chunk, nothing to persist",
                session.session_id
            );
            return;
        }

        info!(
            "Session {}: persisting final chunk ({} samples, {}ms)",
            session.session_id,
            chunk.sample_count(),
            chunk.span_ms()
        );

        let bytes = match chunk.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Session {}: dropping final chunk: {}", session.session_id, e);
                self.send_status(format!("Encode error: {e}")).await;
                return;
            }
        };

        let (reply_tx, reply_rx) = oneshot::channel();
        let request = PersistRequest {
            bytes,
            reply: reply_tx,
        };

        if self
            .events_tx
            .send(AgentEvent::Persist(request))
            .await
            .is_err()
        {
            warn!("Persistence channel closed; final chunk lost");
            return;
        }

        match reply_rx.await {
            Ok(outcome) if outcome.success => {
                self.send_status(format!(
                    "Recording completely stopped, saved {}",
                    outcome.filename.unwrap_or_default()
                ))
                .await;
            }
            Ok(outcome) => {
                self.send_status(format!(
                    "Final save error: {}",
                    outcome.error.unwrap_or_default()
                ))
                .await;
            }
            Err(_) => warn!("No response for final persist request"),
        }
    }

    async fn send_status(&self, text: String) {
        let _ = self.events_tx.send(AgentEvent::Status(text)).await;
    }
}
