use std::time::Duration;

use tokio::time::{sleep_until, Instant};
use tracing::info;

/// How long to wait for the agent's final-save acknowledgment before
/// forcing exit. Fixed, not configurable.
pub const FINAL_SAVE_TIMEOUT: Duration = Duration::from_millis(3000);

/// Phases of an orchestrator shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownPhase {
    Running,
    ShutdownRequested,
    Cleanup,
    Exited,
}

/// Which path reached cleanup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownOutcome {
    /// The agent acknowledged its final save in time.
    Acknowledged,
    /// The bounded wait elapsed; exit proceeds anyway.
    TimedOut,
}

/// Tracks the shutdown handshake.
///
/// Idempotency is structural: `begin` moves `Running → ShutdownRequested`
/// exactly once, so concurrent shutdown triggers collapse into one sequence
/// and the deadline is armed (and can fire) at most once.
#[derive(Debug)]
pub struct ShutdownCoordinator {
    phase: ShutdownPhase,
    deadline: Option<Instant>,
}

impl ShutdownCoordinator {
    pub fn new() -> Self {
        Self {
            phase: ShutdownPhase::Running,
            deadline: None,
        }
    }

    pub fn phase(&self) -> ShutdownPhase {
        self.phase
    }

    pub fn is_requested(&self) -> bool {
        self.phase != ShutdownPhase::Running
    }

    /// Enter `ShutdownRequested` and arm the bounded wait.
    /// Returns false (and does nothing) if shutdown is already under way.
    pub fn begin(&mut self) -> bool {
        if self.phase != ShutdownPhase::Running {
            return false;
        }
        self.phase = ShutdownPhase::ShutdownRequested;
        self.deadline = Some(Instant::now() + FINAL_SAVE_TIMEOUT);
        info!(
            "Shutdown requested, waiting up to {:?} for final save",
            FINAL_SAVE_TIMEOUT
        );
        true
    }

    /// Completes when the armed deadline elapses; pends forever while no
    /// deadline is armed. `acknowledge` and `force` both disarm, so the
    /// timeout fires at most once per shutdown sequence.
    pub async fn deadline_elapsed(&self) {
        match self.deadline {
            Some(deadline) => sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    }

    /// The acknowledgment arrived: move to cleanup on the happy path.
    pub fn acknowledge(&mut self) -> ShutdownOutcome {
        self.deadline = None;
        self.phase = ShutdownPhase::Cleanup;
        ShutdownOutcome::Acknowledged
    }

    /// The bounded wait elapsed: move to cleanup on the forced path.
    pub fn force(&mut self) -> ShutdownOutcome {
        self.deadline = None;
        self.phase = ShutdownPhase::Cleanup;
        ShutdownOutcome::TimedOut
    }

    /// Cleanup done; the process exits with success either way.
    pub fn finish(&mut self) {
        self.phase = ShutdownPhase::Exited;
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
