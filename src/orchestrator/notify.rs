use tracing::info;

use crate::bus::PersistedRecording;

/// Presentation interface. The whole tray/window surface is behind this
/// trait; the core only ever pushes text and save results through it.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Transient state text ("Recording (300s interval)", "Save error: …").
    async fn status(&self, text: &str);

    /// A chunk was durably stored.
    async fn saved(&self, recording: &PersistedRecording);
}

/// Default notifier: log lines only.
pub struct LogNotifier;

#[async_trait::async_trait]
impl Notifier for LogNotifier {
    async fn status(&self, text: &str) {
        info!("Status: {}", text);
    }

    async fn saved(&self, recording: &PersistedRecording) {
        info!(
            "Saved recording {} ({} bytes)",
            recording.filename, recording.byte_len
        );
    }
}

/// Desktop-notification notifier (opt-in via --notify).
pub struct DesktopNotifier {
    app_name: String,
}

impl DesktopNotifier {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
        }
    }

    fn show(&self, summary: &str, body: &str) {
        let result = notify_rust::Notification::new()
            .appname(&self.app_name)
            .summary(summary)
            .body(body)
            .show();
        if let Err(e) = result {
            tracing::warn!("Failed to show notification: {}", e);
        }
    }
}

#[async_trait::async_trait]
impl Notifier for DesktopNotifier {
    async fn status(&self, text: &str) {
        info!("Status: {}", text);
    }

    async fn saved(&self, recording: &PersistedRecording) {
        info!(
            "Saved recording {} ({} bytes)",
            recording.filename, recording.byte_len
        );
        self.show("Recording saved", &recording.filename);
    }
}
