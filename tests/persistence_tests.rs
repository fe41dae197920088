// Integration tests for the persistence writer

use anyhow::Result;
use tempfile::TempDir;
use voicelog::RecordingWriter;

#[test]
fn persists_bytes_under_timestamped_name() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let writer = RecordingWriter::new(temp_dir.path().to_path_buf());

    let bytes = b"RIFF fake wav payload";
    let recording = writer.persist(bytes)?;

    assert!(recording.filename.starts_with("recording-"));
    assert!(recording.filename.ends_with(".wav"));
    assert_eq!(recording.byte_len, bytes.len() as u64);

    // recording-YYYY-MM-DD_HH-MM-SS.wav
    let stamp = recording
        .filename
        .trim_start_matches("recording-")
        .trim_end_matches(".wav");
    assert_eq!(stamp.len(), "2026-01-01_00-00-00".len());

    let on_disk = std::fs::read(temp_dir.path().join(&recording.filename))?;
    assert_eq!(on_disk, bytes);

    Ok(())
}

#[test]
fn creates_output_directory_recursively() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let nested = temp_dir.path().join("a").join("b").join("recordings");
    let writer = RecordingWriter::new(nested.clone());

    writer.persist(b"payload")?;
    assert!(nested.is_dir());

    // Idempotent: a second persist into the existing directory succeeds.
    writer.persist(b"payload")?;

    Ok(())
}

#[test]
fn same_second_completions_never_overwrite() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let writer = RecordingWriter::new(temp_dir.path().to_path_buf());

    let first = writer.persist(b"first chunk")?;
    let second = writer.persist(b"second chunk")?;
    let third = writer.persist(b"third chunk")?;

    assert_ne!(first.filename, second.filename);
    assert_ne!(second.filename, third.filename);

    // When the clock did not advance between writes, the later files carry
    // a numeric suffix.
    if second.filename.len() > first.filename.len() {
        assert!(second.filename.ends_with("-2.wav"));
    }

    let entries: Vec<_> = std::fs::read_dir(temp_dir.path())?.collect();
    assert_eq!(entries.len(), 3, "every persist produced its own file");

    assert_eq!(
        std::fs::read(temp_dir.path().join(&first.filename))?,
        b"first chunk"
    );

    Ok(())
}

#[test]
fn unwritable_target_reports_a_descriptive_error() -> Result<()> {
    let temp_dir = TempDir::new()?;

    // Occupy the output path with a regular file so the directory cannot
    // be created.
    let blocked = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocked, b"occupied")?;

    let writer = RecordingWriter::new(blocked);
    let err = writer.persist(b"chunk").unwrap_err();

    let message = err.to_string();
    assert!(
        message.contains("recordings directory"),
        "error should name the failing step, got: {message}"
    );

    Ok(())
}
