pub mod agent;
pub mod audio;
pub mod bus;
pub mod config;
pub mod orchestrator;

pub use agent::{ControllerState, RecordingController};
pub use audio::{
    encode_wav, AudioChunk, AudioFrame, CaptureBackend, CaptureError, ChunkFormat, EncodeError,
    MicBackend,
};
pub use bus::{AgentEvent, ControlCommand, PersistOutcome, PersistRequest, PersistedRecording};
pub use config::{ConfigStore, RecordingConfig, DEFAULT_INTERVAL_MS};
pub use orchestrator::{
    DesktopNotifier, ExternalSignal, LogNotifier, Notifier, Orchestrator, PersistError,
    RecordingWriter, ShutdownCoordinator, ShutdownOutcome, ShutdownPhase, FINAL_SAVE_TIMEOUT,
};
