//! Capture agent: the recording state machine and rotation loop.
//!
//! The agent owns the microphone for the lifetime of a session and talks to
//! the orchestrator only through the bus.

mod controller;

pub use controller::{ControllerState, RecordingController};
