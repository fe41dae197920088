use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use voicelog::{
    bus, orchestrator::signals, ConfigStore, DesktopNotifier, LogNotifier, MicBackend, Notifier,
    Orchestrator, RecordingController, RecordingWriter, ShutdownOutcome,
};

#[derive(Parser)]
#[command(name = "voicelog")]
#[command(about = "Resident background voice recorder")]
struct Args {
    /// Path to the JSON config file (created with defaults if absent)
    #[arg(short, long, default_value = "recording-config.json")]
    config: PathBuf,

    /// Directory recordings are written to
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Show a desktop notification for each saved recording
    #[arg(long)]
    notify: bool,
}

fn default_output_dir() -> PathBuf {
    dirs::audio_dir()
        .map(|dir| dir.join("voicelog"))
        .unwrap_or_else(|| PathBuf::from("recordings"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let output_dir = args.output_dir.unwrap_or_else(default_output_dir);

    info!("voicelog v{}", env!("CARGO_PKG_VERSION"));

    let (orchestrator_side, agent_side) = bus::channel();

    let controller = RecordingController::new(Box::new(MicBackend::new()), agent_side);
    let agent_task = tokio::spawn(controller.run());

    let notifier: Box<dyn Notifier> = if args.notify {
        Box::new(DesktopNotifier::new("voicelog"))
    } else {
        Box::new(LogNotifier)
    };

    let orchestrator = Orchestrator::new(
        ConfigStore::new(args.config),
        RecordingWriter::new(output_dir),
        notifier,
        orchestrator_side,
        signals::listen()?,
    );

    match orchestrator.run().await? {
        ShutdownOutcome::Acknowledged => info!("Exited after final save"),
        ShutdownOutcome::TimedOut => info!("Exited after bounded wait"),
    }

    // The forced path abandons the agent task rather than waiting on it.
    agent_task.abort();

    Ok(())
}
