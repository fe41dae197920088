// Shared test doubles: scripted capture backends driving the controller on
// the (paused) tokio clock.
#![allow(dead_code)] // not every test binary uses every double

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use voicelog::{AudioFrame, CaptureBackend, CaptureError};

pub const SAMPLE_RATE: u32 = 16_000;
pub const CHANNELS: u16 = 1;

/// Feeds one synthetic frame every `frame_ms` of virtual time until the
/// receiver is dropped or the backend is stopped.
pub struct ScriptedBackend {
    frame_ms: u64,
    samples_per_frame: usize,
    start_count: Arc<AtomicUsize>,
    task: Option<JoinHandle<()>>,
}

impl ScriptedBackend {
    pub fn new(frame_ms: u64, samples_per_frame: usize) -> Self {
        Self {
            frame_ms,
            samples_per_frame,
            start_count: Arc::new(AtomicUsize::new(0)),
            task: None,
        }
    }

    /// Shared counter of how many times the device was (re)acquired.
    pub fn start_counter(&self) -> Arc<AtomicUsize> {
        Arc::clone(&self.start_count)
    }
}

#[async_trait::async_trait]
impl CaptureBackend for ScriptedBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        self.start_count.fetch_add(1, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel(1024);
        let frame_ms = self.frame_ms;
        let samples_per_frame = self.samples_per_frame;

        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(frame_ms));
            interval.tick().await; // first tick is immediate
            let mut elapsed_ms = 0u64;
            loop {
                interval.tick().await;
                elapsed_ms += frame_ms;
                let frame = AudioFrame {
                    samples: vec![0i16; samples_per_frame],
                    sample_rate: SAMPLE_RATE,
                    channels: CHANNELS,
                    timestamp_ms: elapsed_ms,
                };
                if tx.send(frame).await.is_err() {
                    break;
                }
            }
        });

        self.task = Some(task);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        if let Some(task) = self.task.take() {
            task.abort();
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.task.is_some()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Holds the frame channel open but never produces a sample.
pub struct SilentBackend {
    holder: Option<mpsc::Sender<AudioFrame>>,
}

impl SilentBackend {
    pub fn new() -> Self {
        Self { holder: None }
    }
}

#[async_trait::async_trait]
impl CaptureBackend for SilentBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        let (tx, rx) = mpsc::channel(8);
        self.holder = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.holder = None;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.holder.is_some()
    }

    fn name(&self) -> &str {
        "silent"
    }
}

/// Always fails to acquire the device.
pub struct UnavailableBackend;

#[async_trait::async_trait]
impl CaptureBackend for UnavailableBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        Err(CaptureError::DeviceUnavailable(
            "permission denied".to_string(),
        ))
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "unavailable"
    }
}

/// Number of samples in an encoded WAV byte sequence.
pub fn wav_sample_count(bytes: &[u8]) -> usize {
    let reader = hound::WavReader::new(std::io::Cursor::new(bytes)).expect("valid WAV container");
    reader.len() as usize
}
