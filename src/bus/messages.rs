use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

/// Commands sent from the orchestrator to the capture agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// Begin a recording session rotating chunks every `interval_ms`.
    Start { interval_ms: u64 },
    /// Drain the in-flight chunk and restart with a new interval.
    UpdateInterval { interval_ms: u64 },
    /// Begin shutdown: persist the final chunk, then acknowledge.
    StopBeforeQuit,
}

/// Result of one persistence request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistOutcome {
    pub success: bool,
    pub filename: Option<String>,
    pub error: Option<String>,
}

impl PersistOutcome {
    pub fn ok(filename: String) -> Self {
        Self {
            success: true,
            filename: Some(filename),
            error: None,
        }
    }

    pub fn failed(error: String) -> Self {
        Self {
            success: false,
            filename: None,
            error: Some(error),
        }
    }
}

/// A durably stored chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedRecording {
    pub filename: String,
    pub byte_len: u64,
}

/// One encoded chunk handed off for persistence, with the reply channel the
/// orchestrator answers on. Handoff transfers ownership of the bytes; the
/// agent never touches a chunk again after sending this.
#[derive(Debug)]
pub struct PersistRequest {
    pub bytes: Vec<u8>,
    pub reply: oneshot::Sender<PersistOutcome>,
}

/// Events sent from the capture agent to the orchestrator.
#[derive(Debug)]
pub enum AgentEvent {
    /// Request to durably store one encoded chunk (request/response).
    Persist(PersistRequest),
    /// Human-readable state text for the presentation layer.
    Status(String),
    /// The final chunk has been persisted; shutdown may proceed.
    FinalSaveCompleted,
}
