//! Typed message bus between the orchestrator and the capture agent.
//!
//! Both directions are bounded mpsc channels; persistence requests carry a
//! oneshot reply sender for their response. This is the only seam between
//! the two state machines — no state is shared across it.

pub mod messages;

pub use messages::{
    AgentEvent, ControlCommand, PersistOutcome, PersistRequest, PersistedRecording,
};

use tokio::sync::mpsc;

const CONTROL_CAPACITY: usize = 8;
const EVENT_CAPACITY: usize = 64;

/// Orchestrator-side endpoints.
pub struct OrchestratorSide {
    pub control_tx: mpsc::Sender<ControlCommand>,
    pub events_rx: mpsc::Receiver<AgentEvent>,
}

/// Agent-side endpoints.
pub struct AgentSide {
    pub control_rx: mpsc::Receiver<ControlCommand>,
    pub events_tx: mpsc::Sender<AgentEvent>,
}

/// Build the channel pair connecting the two components.
pub fn channel() -> (OrchestratorSide, AgentSide) {
    let (control_tx, control_rx) = mpsc::channel(CONTROL_CAPACITY);
    let (events_tx, events_rx) = mpsc::channel(EVENT_CAPACITY);

    (
        OrchestratorSide {
            control_tx,
            events_rx,
        },
        AgentSide {
            control_rx,
            events_tx,
        },
    )
}
