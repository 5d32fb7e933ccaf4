//! Audio file I/O operations
//!
//! Handles loading and saving WAV files using the hound crate.

use crate::audio::AudioBuffer;
use crate::error::{Result, SubtoneError};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::path::Path;

/// Load a WAV file into an AudioBuffer
pub fn load_wav<P: AsRef<Path>>(path: P) -> Result<AudioBuffer> {
    let path = path.as_ref();
    let reader = WavReader::open(path).map_err(|e| SubtoneError::AudioReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    let spec = reader.spec();
    let channels = spec.channels;
    let sample_rate = spec.sample_rate;

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .map(|s| {
                s.map_err(|e| SubtoneError::AudioReadError {
                    path: path.display().to_string(),
                    source: e,
                })
            })
            .collect::<Result<Vec<f32>>>()?,
        SampleFormat::Int => {
            let bits = spec.bits_per_sample;
            let max_val = (1u32 << (bits - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| {
                    s.map(|v| v as f32 / max_val)
                        .map_err(|e| SubtoneError::AudioReadError {
                            path: path.display().to_string(),
                            source: e,
                        })
                })
                .collect::<Result<Vec<f32>>>()?
        }
    };

    AudioBuffer::new(samples, channels, sample_rate)
}

/// Save an AudioBuffer to a WAV file (32-bit float)
pub fn save_wav<P: AsRef<Path>>(buffer: &AudioBuffer, path: P) -> Result<()> {
    let path = path.as_ref();
    let spec = WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: SampleFormat::Float,
    };

    let mut writer = WavWriter::create(path, spec).map_err(|e| SubtoneError::AudioWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    for &sample in buffer.samples() {
        writer
            .write_sample(sample)
            .map_err(|e| SubtoneError::AudioWriteError {
                path: path.display().to_string(),
                source: e,
            })?;
    }

    writer.finalize().map_err(|e| SubtoneError::AudioWriteError {
        path: path.display().to_string(),
        source: e,
    })?;

    Ok(())
}
