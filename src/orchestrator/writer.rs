use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use thiserror::Error;
use tracing::{debug, info};

use crate::bus::PersistedRecording;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("failed to create recordings directory {dir}: {source}")]
    CreateDir {
        dir: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write {filename}: {source}")]
    Write {
        filename: String,
        source: std::io::Error,
    },
}

/// Durably stores encoded chunks under timestamp-derived names.
///
/// Names are second-resolution local time; when two chunks complete within
/// the same second, a `-2`, `-3`, … suffix keeps them distinct rather than
/// overwriting.
pub struct RecordingWriter {
    output_dir: PathBuf,
}

impl RecordingWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write one encoded chunk to disk.
    ///
    /// The directory is created on demand (idempotent). The write itself is
    /// a plain file write; a partial file on process crash is an accepted
    /// risk.
    pub fn persist(&self, bytes: &[u8]) -> Result<PersistedRecording, PersistError> {
        fs::create_dir_all(&self.output_dir).map_err(|source| PersistError::CreateDir {
            dir: self.output_dir.clone(),
            source,
        })?;

        let stamp = Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
        let (path, filename) = self.unique_path(&stamp);

        fs::write(&path, bytes).map_err(|source| PersistError::Write {
            filename: filename.clone(),
            source,
        })?;

        info!("Saved audio file: {} ({} bytes)", filename, bytes.len());

        Ok(PersistedRecording {
            filename,
            byte_len: bytes.len() as u64,
        })
    }

    /// Resolve a free filename for this timestamp. Same-second completions
    /// get a numeric suffix instead of overwriting the earlier file.
    fn unique_path(&self, stamp: &str) -> (PathBuf, String) {
        let base = format!("recording-{stamp}.wav");
        let candidate = self.output_dir.join(&base);
        if !candidate.exists() {
            return (candidate, base);
        }

        let mut n = 2u32;
        loop {
            let name = format!("recording-{stamp}-{n}.wav");
            let candidate = self.output_dir.join(&name);
            if !candidate.exists() {
                debug!("Timestamp collision, using {}", name);
                return (candidate, name);
            }
            n += 1;
        }
    }
}
