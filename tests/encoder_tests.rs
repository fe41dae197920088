// Integration tests for chunk encoding
//
// A chunk must encode to a self-contained, independently playable WAV file:
// the canonical 44-byte header followed by little-endian sample bytes.

use std::io::Cursor;

use anyhow::Result;
use voicelog::encode_wav;

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

#[test]
fn header_fields_are_canonical() -> Result<()> {
    let samples: Vec<i16> = vec![1, -2, 3];
    let bytes = encode_wav(&samples, 16_000, 1, 16)?;

    let data_len = (samples.len() * 2) as u32;
    assert_eq!(bytes.len(), 44 + data_len as usize);

    // RIFF chunk descriptor
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(u32_at(&bytes, 4), 36 + data_len);
    assert_eq!(&bytes[8..12], b"WAVE");

    // fmt sub-chunk
    assert_eq!(&bytes[12..16], b"fmt ");
    assert_eq!(u32_at(&bytes, 16), 16); // PCM fmt chunk size
    assert_eq!(u16_at(&bytes, 20), 1); // format tag: PCM
    assert_eq!(u16_at(&bytes, 22), 1); // channels
    assert_eq!(u32_at(&bytes, 24), 16_000); // sample rate
    assert_eq!(u32_at(&bytes, 28), 32_000); // byte rate
    assert_eq!(u16_at(&bytes, 32), 2); // block align
    assert_eq!(u16_at(&bytes, 34), 16); // bits per sample

    // data sub-chunk
    assert_eq!(&bytes[36..40], b"data");
    assert_eq!(u32_at(&bytes, 40), data_len);

    Ok(())
}

#[test]
fn samples_are_little_endian_after_header() -> Result<()> {
    let bytes = encode_wav(&[0x0102, -1], 44_100, 1, 16)?;

    assert_eq!(&bytes[44..46], &[0x02, 0x01]);
    assert_eq!(&bytes[46..48], &[0xFF, 0xFF]);

    Ok(())
}

#[test]
fn zero_sample_chunk_is_a_valid_container() -> Result<()> {
    let bytes = encode_wav(&[], 44_100, 1, 16)?;

    assert_eq!(bytes.len(), 44);
    assert_eq!(u32_at(&bytes, 4), 36);
    assert_eq!(u32_at(&bytes, 40), 0);
    assert_eq!(&bytes[36..40], b"data");

    // Still decodable
    let reader = hound::WavReader::new(Cursor::new(&bytes))?;
    assert_eq!(reader.len(), 0);

    Ok(())
}

#[test]
fn stereo_byte_rate_and_block_align() -> Result<()> {
    let bytes = encode_wav(&[0; 8], 44_100, 2, 16)?;

    assert_eq!(u16_at(&bytes, 22), 2);
    assert_eq!(u32_at(&bytes, 28), 44_100 * 2 * 2);
    assert_eq!(u16_at(&bytes, 32), 4);

    Ok(())
}

#[test]
fn round_trip_recovers_format_and_samples_exactly() -> Result<()> {
    let samples: Vec<i16> = (0..4800).map(|i| ((i * 37) % 20_000) as i16 - 10_000).collect();
    let bytes = encode_wav(&samples, 48_000, 1, 16)?;

    let mut reader = hound::WavReader::new(Cursor::new(&bytes))?;
    let spec = reader.spec();
    assert_eq!(spec.sample_rate, 48_000);
    assert_eq!(spec.channels, 1);
    assert_eq!(spec.bits_per_sample, 16);
    assert_eq!(spec.sample_format, hound::SampleFormat::Int);

    let decoded: Vec<i16> = reader.samples::<i16>().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(decoded, samples);

    Ok(())
}

#[test]
fn encoding_is_deterministic() -> Result<()> {
    let samples: Vec<i16> = vec![7; 1600];
    let first = encode_wav(&samples, 16_000, 1, 16)?;
    let second = encode_wav(&samples, 16_000, 1, 16)?;

    assert_eq!(first, second);

    Ok(())
}
