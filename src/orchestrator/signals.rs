//! OS signal listeners feeding the orchestrator loop.

use tokio::sync::mpsc;
use tracing::info;

/// External requests that arrive as process signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalSignal {
    /// Terminate: stop recording, persist the final chunk, exit.
    Shutdown,
    /// Re-read the config file and apply a changed interval.
    ReloadConfig,
}

/// Spawn signal listener tasks and return the channel they feed.
/// Must be called from within a tokio runtime.
pub fn listen() -> std::io::Result<mpsc::Receiver<ExternalSignal>> {
    let (tx, rx) = mpsc::channel(4);
    spawn_listeners(tx)?;
    Ok(rx)
}

#[cfg(unix)]
fn spawn_listeners(tx: mpsc::Sender<ExternalSignal>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let tx_int = tx.clone();
    tokio::spawn(async move {
        while sigint.recv().await.is_some() {
            info!("Received SIGINT");
            if tx_int.send(ExternalSignal::Shutdown).await.is_err() {
                break;
            }
        }
    });

    let mut sigterm = signal(SignalKind::terminate())?;
    let tx_term = tx.clone();
    tokio::spawn(async move {
        while sigterm.recv().await.is_some() {
            info!("Received SIGTERM");
            if tx_term.send(ExternalSignal::Shutdown).await.is_err() {
                break;
            }
        }
    });

    let mut sighup = signal(SignalKind::hangup())?;
    tokio::spawn(async move {
        while sighup.recv().await.is_some() {
            info!("Received SIGHUP");
            if tx.send(ExternalSignal::ReloadConfig).await.is_err() {
                break;
            }
        }
    });

    Ok(())
}

#[cfg(not(unix))]
fn spawn_listeners(tx: mpsc::Sender<ExternalSignal>) -> std::io::Result<()> {
    tokio::spawn(async move {
        loop {
            if tokio::signal::ctrl_c().await.is_err() {
                break;
            }
            info!("Received Ctrl+C");
            if tx.send(ExternalSignal::Shutdown).await.is_err() {
                break;
            }
        }
    });
    Ok(())
}
