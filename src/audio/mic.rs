// Microphone capture backend built on cpal.
//
// cpal streams are not Send, so the stream lives on a dedicated thread for
// the duration of a session. The audio callback converts samples to i16 and
// hands frames to the agent over a bounded channel with try_send; a slow
// consumer drops frames instead of blocking the callback.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use super::backend::{AudioFrame, CaptureBackend, CaptureError};

/// Frames buffered between the capture thread and the agent.
const FRAME_CHANNEL_CAPACITY: usize = 64;

/// Microphone capture backend using the default input device.
pub struct MicBackend {
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl MicBackend {
    pub fn new() -> Self {
        Self {
            stop_flag: Arc::new(AtomicBool::new(false)),
            thread: None,
        }
    }
}

impl Default for MicBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CaptureBackend for MicBackend {
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError> {
        if self.thread.is_some() {
            return Err(CaptureError::StreamFailed(
                "capture already running".to_string(),
            ));
        }

        let (frame_tx, frame_rx) = mpsc::channel(FRAME_CHANNEL_CAPACITY);
        let (ready_tx, ready_rx) = oneshot::channel();

        let stop_flag = Arc::new(AtomicBool::new(false));
        let thread_stop = Arc::clone(&stop_flag);

        let thread = std::thread::Builder::new()
            .name("voicelog-capture".to_string())
            .spawn(move || capture_thread(frame_tx, ready_tx, thread_stop))
            .map_err(|e| CaptureError::StreamFailed(e.to_string()))?;

        // The thread reports device acquisition before settling into its
        // hold loop; a dropped sender means it panicked during setup.
        match ready_rx.await {
            Ok(Ok(())) => {
                self.stop_flag = stop_flag;
                self.thread = Some(thread);
                Ok(frame_rx)
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(CaptureError::StreamFailed(
                    "capture thread died during startup".to_string(),
                ))
            }
        }
    }

    async fn stop(&mut self) -> Result<(), CaptureError> {
        self.stop_flag.store(true, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            // The hold loop polls every 50ms, so the join is brief.
            if thread.join().is_err() {
                warn!("Capture thread panicked during shutdown");
            }
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.thread.is_some()
    }

    fn name(&self) -> &str {
        "cpal-microphone"
    }
}

impl Drop for MicBackend {
    fn drop(&mut self) {
        self.stop_flag.store(true, Ordering::SeqCst);
    }
}

/// Owns the cpal stream for the lifetime of one session.
fn capture_thread(
    frame_tx: mpsc::Sender<AudioFrame>,
    ready_tx: oneshot::Sender<Result<(), CaptureError>>,
    stop_flag: Arc<AtomicBool>,
) {
    let stream = match open_stream(frame_tx) {
        Ok(stream) => {
            let _ = ready_tx.send(Ok(()));
            stream
        }
        Err(e) => {
            let _ = ready_tx.send(Err(e));
            return;
        }
    };

    while !stop_flag.load(Ordering::SeqCst) {
        std::thread::sleep(Duration::from_millis(50));
    }

    drop(stream);
    info!("Capture stream released");
}

fn open_stream(frame_tx: mpsc::Sender<AudioFrame>) -> Result<Stream, CaptureError> {
    let host = cpal::default_host();

    let device = host
        .default_input_device()
        .ok_or_else(|| CaptureError::DeviceUnavailable("no input device found".to_string()))?;

    let supported = device
        .default_input_config()
        .map_err(|e| CaptureError::DeviceUnavailable(e.to_string()))?;

    info!(
        "Capture device: {} ({} Hz, {} channels, {:?})",
        device.name().unwrap_or_else(|_| "<unnamed>".to_string()),
        supported.sample_rate().0,
        supported.channels(),
        supported.sample_format()
    );

    let sample_format = supported.sample_format();
    let config: StreamConfig = supported.into();

    let stream = match sample_format {
        SampleFormat::I16 => build_stream_typed::<i16>(&device, &config, frame_tx)?,
        SampleFormat::U16 => build_stream_typed::<u16>(&device, &config, frame_tx)?,
        SampleFormat::F32 => build_stream_typed::<f32>(&device, &config, frame_tx)?,
        other => {
            return Err(CaptureError::StreamFailed(format!(
                "unsupported sample format {other:?}"
            )))
        }
    };

    stream
        .play()
        .map_err(|e| CaptureError::StreamFailed(e.to_string()))?;

    Ok(stream)
}

fn build_stream_typed<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    frame_tx: mpsc::Sender<AudioFrame>,
) -> Result<Stream, CaptureError>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let sample_rate = config.sample_rate.0;
    let channels = config.channels;
    let started = Instant::now();

    let err_fn = |err| warn!("Audio stream error: {}", err);

    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let samples: Vec<i16> = data.iter().map(|&s| sample_to_i16(s)).collect();
                let frame = AudioFrame {
                    samples,
                    sample_rate,
                    channels,
                    timestamp_ms: started.elapsed().as_millis() as u64,
                };
                // Never block inside the audio callback.
                let _ = frame_tx.try_send(frame);
            },
            err_fn,
            None,
        )
        .map_err(|e| CaptureError::StreamFailed(e.to_string()))
}

/// Convert any sample type to i16 for the chunk pipeline.
fn sample_to_i16<T>(sample: T) -> i16
where
    f32: FromSample<T>,
{
    let f32_sample = f32::from_sample(sample);
    let clamped = f32_sample.clamp(-1.0, 1.0);
    (clamped * i16::MAX as f32) as i16
}
