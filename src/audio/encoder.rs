use std::io::Cursor;

use thiserror::Error;

use super::backend::AudioFrame;

/// Bit depth of every chunk this crate produces. Frames carry i16 samples,
/// so the container always declares 16 bits per sample.
pub const BITS_PER_SAMPLE: u16 = 16;

/// Encoding failure. Indicates format parameters the WAV container cannot
/// express; with the fixed i16/16-bit pipeline this should not occur, and a
/// failing chunk is dropped rather than crashing the session.
#[derive(Debug, Error)]
#[error("failed to encode chunk: {0}")]
pub struct EncodeError(#[from] hound::Error);

/// Sample format of a chunk, fixed at the first frame it receives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
}

/// Raw samples accumulated between two chunk-boundary events.
///
/// Owned by the capture agent until handed off for persistence; handoff
/// moves the chunk, so it cannot be reused or mutated afterwards.
#[derive(Debug, Default)]
pub struct AudioChunk {
    samples: Vec<i16>,
    format: Option<ChunkFormat>,
    started_at_ms: Option<u64>,
    last_frame_ms: u64,
}

impl AudioChunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame's samples. The first frame fixes the chunk's format.
    pub fn push_frame(&mut self, frame: &AudioFrame) {
        if self.format.is_none() {
            self.format = Some(ChunkFormat {
                sample_rate: frame.sample_rate,
                channels: frame.channels,
                bits_per_sample: BITS_PER_SAMPLE,
            });
            self.started_at_ms = Some(frame.timestamp_ms);
        }
        self.samples.extend_from_slice(&frame.samples);
        self.last_frame_ms = frame.timestamp_ms;
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn format(&self) -> Option<ChunkFormat> {
        self.format
    }

    /// Span covered by the frames in this chunk, in capture-clock time.
    pub fn span_ms(&self) -> u64 {
        match self.started_at_ms {
            Some(start) => self.last_frame_ms.saturating_sub(start),
            None => 0,
        }
    }

    /// Encode this chunk as a standalone WAV byte sequence, consuming it.
    pub fn encode(self) -> Result<Vec<u8>, EncodeError> {
        // Empty chunks are skipped by the caller; encoding one anyway must
        // still yield a valid container, so fall back to a nominal format.
        let format = self.format.unwrap_or(ChunkFormat {
            sample_rate: 44_100,
            channels: 1,
            bits_per_sample: BITS_PER_SAMPLE,
        });
        encode_wav(
            &self.samples,
            format.sample_rate,
            format.channels,
            format.bits_per_sample,
        )
    }
}

/// Encode raw PCM samples as a self-contained, independently playable WAV
/// file: the canonical 44-byte header (RIFF size = 36 + data length, data
/// size = data length) followed by little-endian sample bytes.
///
/// Pure and deterministic; valid for any sample count including zero.
pub fn encode_wav(
    samples: &[i16],
    sample_rate: u32,
    channels: u16,
    bits_per_sample: u16,
) -> Result<Vec<u8>, EncodeError> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &sample in samples {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}
