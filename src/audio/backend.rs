use thiserror::Error;
use tokio::sync::mpsc;

/// Errors raised by a capture backend.
#[derive(Debug, Clone, Error)]
pub enum CaptureError {
    /// No usable input device, or permission to use it was denied.
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),

    /// The device exists but the stream could not be opened.
    #[error("failed to open capture stream: {0}")]
    StreamFailed(String),
}

/// Audio sample data (16-bit PCM, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    /// Raw audio samples (i16 PCM, interleaved)
    pub samples: Vec<i16>,
    /// Sample rate in Hz
    pub sample_rate: u32,
    /// Number of channels
    pub channels: u16,
    /// Timestamp in milliseconds since capture started
    pub timestamp_ms: u64,
}

impl AudioFrame {
    /// Duration this frame covers, derived from sample count and format.
    pub fn duration_ms(&self) -> u64 {
        if self.sample_rate == 0 || self.channels == 0 {
            return 0;
        }
        let per_channel = self.samples.len() as u64 / self.channels as u64;
        per_channel * 1000 / self.sample_rate as u64
    }
}

/// Audio capture backend trait
///
/// Implementations:
/// - `MicBackend`: cpal microphone capture (production)
/// - scripted backends in tests feeding synthetic frames
#[async_trait::async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Acquire the device and start capturing.
    ///
    /// Returns a channel receiver that will receive audio frames. The
    /// device is held exclusively by this backend until `stop` releases it.
    async fn start(&mut self) -> Result<mpsc::Receiver<AudioFrame>, CaptureError>;

    /// Stop capturing and release the device.
    async fn stop(&mut self) -> Result<(), CaptureError>;

    /// Check if the backend is currently capturing
    fn is_capturing(&self) -> bool;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
