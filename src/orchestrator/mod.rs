//! Orchestrator: owns configuration, persistence, the presentation
//! interface, and the shutdown handshake.

pub mod notify;
pub mod shutdown;
pub mod signals;
pub mod writer;

pub use notify::{DesktopNotifier, LogNotifier, Notifier};
pub use shutdown::{ShutdownCoordinator, ShutdownOutcome, ShutdownPhase, FINAL_SAVE_TIMEOUT};
pub use signals::ExternalSignal;
pub use writer::{PersistError, RecordingWriter};

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::bus::{AgentEvent, ControlCommand, OrchestratorSide, PersistOutcome, PersistRequest};
use crate::config::ConfigStore;

/// The orchestrator event loop.
///
/// Services persist requests from the agent (also during the shutdown
/// wait — the final chunk round-trips through here), forwards status text
/// to the presentation layer, and drives the shutdown handshake.
pub struct Orchestrator {
    config_store: ConfigStore,
    writer: RecordingWriter,
    notifier: Box<dyn Notifier>,
    control_tx: mpsc::Sender<ControlCommand>,
    events_rx: mpsc::Receiver<AgentEvent>,
    signals_rx: mpsc::Receiver<ExternalSignal>,
    signals_closed: bool,
    coordinator: ShutdownCoordinator,
    interval_ms: u64,
}

impl Orchestrator {
    pub fn new(
        config_store: ConfigStore,
        writer: RecordingWriter,
        notifier: Box<dyn Notifier>,
        side: OrchestratorSide,
        signals_rx: mpsc::Receiver<ExternalSignal>,
    ) -> Self {
        Self {
            config_store,
            writer,
            notifier,
            control_tx: side.control_tx,
            events_rx: side.events_rx,
            signals_rx,
            signals_closed: false,
            coordinator: ShutdownCoordinator::new(),
            interval_ms: 0,
        }
    }

    /// Run until shutdown completes. Both the acknowledged and the forced
    /// path return `Ok`; the forced path is a deliberate tradeoff, not a
    /// failure.
    pub async fn run(mut self) -> Result<ShutdownOutcome> {
        let cfg = self.config_store.load().context("loading configuration")?;
        self.interval_ms = cfg.interval_ms;

        info!(
            "Starting recording with {}ms chunk interval, output: {}",
            self.interval_ms,
            self.writer.output_dir().display()
        );

        self.control_tx
            .send(ControlCommand::Start {
                interval_ms: self.interval_ms,
            })
            .await
            .context("capture agent unavailable at startup")?;

        let outcome = loop {
            tokio::select! {
                event = self.events_rx.recv() => match event {
                    Some(AgentEvent::Persist(request)) => self.handle_persist(request).await,
                    Some(AgentEvent::Status(text)) => self.notifier.status(&text).await,
                    Some(AgentEvent::FinalSaveCompleted) => {
                        if self.coordinator.is_requested() {
                            info!("Final save completed, shutting down");
                            break self.coordinator.acknowledge();
                        }
                        warn!("Unexpected final-save acknowledgment, ignoring");
                    }
                    None => {
                        warn!("Capture agent went away");
                        self.coordinator.begin();
                        break self.coordinator.acknowledge();
                    }
                },

                sig = self.signals_rx.recv(), if !self.signals_closed => match sig {
                    Some(ExternalSignal::Shutdown) => self.begin_shutdown().await,
                    Some(ExternalSignal::ReloadConfig) => self.reload_config().await,
                    None => {
                        // Listener tasks went away; treat it as a shutdown
                        // request and stop polling the closed channel.
                        self.signals_closed = true;
                        self.begin_shutdown().await;
                    }
                },

                _ = self.coordinator.deadline_elapsed() => {
                    warn!("No final-save acknowledgment within the bound, forcing exit");
                    break self.coordinator.force();
                }
            }
        };

        self.cleanup();
        Ok(outcome)
    }

    /// Durably store one chunk and reply with the outcome.
    async fn handle_persist(&mut self, request: PersistRequest) {
        let outcome = match self.writer.persist(&request.bytes) {
            Ok(recording) => {
                self.notifier.saved(&recording).await;
                PersistOutcome::ok(recording.filename)
            }
            Err(e) => {
                warn!("Persistence failed: {}", e);
                PersistOutcome::failed(e.to_string())
            }
        };
        // A dropped reply means the agent lost interest (e.g. forced exit
        // already under way); the file, if written, stays.
        let _ = request.reply.send(outcome);
    }

    async fn begin_shutdown(&mut self) {
        if !self.coordinator.begin() {
            return;
        }
        if self
            .control_tx
            .send(ControlCommand::StopBeforeQuit)
            .await
            .is_err()
        {
            warn!("Capture agent already gone; bounded wait still applies");
        }
    }

    /// Re-read the config file; a changed interval restarts the session.
    async fn reload_config(&mut self) {
        if self.coordinator.is_requested() {
            return;
        }
        match self.config_store.load() {
            Ok(cfg) if cfg.interval_ms != self.interval_ms => {
                info!(
                    "Recording interval updated: {}ms -> {}ms",
                    self.interval_ms, cfg.interval_ms
                );
                self.interval_ms = cfg.interval_ms;
                let _ = self
                    .control_tx
                    .send(ControlCommand::UpdateInterval {
                        interval_ms: cfg.interval_ms,
                    })
                    .await;
            }
            Ok(_) => info!("Config reloaded, interval unchanged"),
            Err(e) => {
                warn!("Config reload failed: {}", e);
                self.notifier.status(&format!("Config reload error: {e}")).await;
            }
        }
    }

    /// Release resident presentation resources. Reached from both shutdown
    /// paths; the process exits 0 either way.
    fn cleanup(&mut self) {
        info!("Cleaning up presentation resources");
        self.coordinator.finish();
    }
}
