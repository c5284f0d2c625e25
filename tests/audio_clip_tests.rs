// Integration tests for audio clip decoding.

use anyhow::Result;
use callscribe::audio::AudioClip;
use std::path::{Path, PathBuf};

fn write_fixture(dir: &Path, sample_rate: u32, channels: u16, seconds: f64) -> Result<PathBuf> {
    let path = dir.join("fixture.wav");
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(&path, spec)?;
    let total = (sample_rate as f64 * channels as f64 * seconds) as usize;
    for i in 0..total {
        writer.write_sample(((i % 200) as i16 - 100) * 50)?;
    }
    writer.finalize()?;

    Ok(path)
}

#[test]
fn test_clip_open() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_fixture(dir.path(), 16000, 1, 0.5)?;

    let clip = AudioClip::open(&path)?;

    assert_eq!(clip.sample_rate, 16000);
    assert_eq!(clip.channels, 1);
    assert!((clip.duration_seconds - 0.5).abs() < 0.01);
    assert!(!clip.samples.is_empty());
    assert!(clip.path.contains("fixture.wav"));

    Ok(())
}

#[test]
fn test_clip_sample_count_matches_duration() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_fixture(dir.path(), 8000, 2, 1.0)?;

    let clip = AudioClip::open(&path)?;

    let expected =
        (clip.duration_seconds * clip.sample_rate as f64 * clip.channels as f64) as usize;
    let diff = (clip.samples.len() as i64 - expected as i64).abs();
    assert!(diff <= clip.channels as i64, "off by {} samples", diff);

    // Interleaved stereo must come in whole frames.
    assert_eq!(clip.samples.len() % clip.channels as usize, 0);

    Ok(())
}

#[test]
fn test_clip_pcm_bytes_little_endian() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = write_fixture(dir.path(), 16000, 1, 0.1)?;

    let clip = AudioClip::open(&path)?;
    let bytes = clip.pcm_bytes();

    assert_eq!(bytes.len(), clip.samples.len() * 2);

    let roundtrip: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|chunk| i16::from_le_bytes([chunk[0], chunk[1]]))
        .collect();
    assert_eq!(roundtrip, clip.samples);

    Ok(())
}

#[test]
fn test_clip_nonexistent_path() {
    let result = AudioClip::open("/nonexistent/path/to/audio.wav");
    assert!(result.is_err(), "Opening nonexistent file should fail");
}

#[test]
fn test_clip_rejects_non_wav_bytes() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("not-audio.wav");
    std::fs::write(&path, b"definitely not a RIFF header")?;

    assert!(AudioClip::open(&path).is_err());

    Ok(())
}
