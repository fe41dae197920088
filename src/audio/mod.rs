pub mod backend;
pub mod encoder;
pub mod mic;

pub use backend::{AudioFrame, CaptureBackend, CaptureError};
pub use encoder::{encode_wav, AudioChunk, ChunkFormat, EncodeError, BITS_PER_SAMPLE};
pub use mic::MicBackend;
