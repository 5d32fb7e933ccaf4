//! Audio buffer implementation
//!
//! AudioBuffer holds interleaved float samples plus channel/rate metadata.
//! It is the offline-processing and test currency of the crate; the
//! real-time path works on raw per-channel slices instead.

use crate::error::{Result, SubtoneError};

/// Audio sample data with metadata
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Interleaved audio samples normalized to -1.0..1.0
    samples: Vec<f32>,
    /// Number of audio channels (1 = mono, 2 = stereo)
    channels: u16,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a new audio buffer with the given parameters
    pub fn new(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(SubtoneError::EmptyBuffer);
        }
        if channels == 0 {
            return Err(SubtoneError::ChannelMismatch { channels });
        }
        if samples.len() % channels as usize != 0 {
            return Err(SubtoneError::UnsupportedFormat {
                details: format!(
                    "Sample count {} is not divisible by channel count {}",
                    samples.len(),
                    channels
                ),
            });
        }
        Ok(Self {
            samples,
            channels,
            sample_rate,
        })
    }

    /// Create a silent buffer with the given duration
    pub fn silence(duration_secs: f32, channels: u16, sample_rate: u32) -> Self {
        let num_samples = (duration_secs * sample_rate as f32) as usize * channels as usize;
        Self {
            samples: vec![0.0; num_samples],
            channels,
            sample_rate,
        }
    }

    /// Create a mono sine wave test tone
    pub fn sine_wave(frequency: f32, duration_secs: f32, sample_rate: u32) -> Self {
        let num_samples = (duration_secs * sample_rate as f32) as usize;
        let mut samples = Vec::with_capacity(num_samples);

        for i in 0..num_samples {
            let t = i as f32 / sample_rate as f32;
            samples.push((2.0 * std::f32::consts::PI * frequency * t).sin());
        }

        Self {
            samples,
            channels: 1,
            sample_rate,
        }
    }

    /// Create a stereo sine wave test tone (same signal on both channels)
    pub fn stereo_sine_wave(frequency: f32, duration_secs: f32, sample_rate: u32) -> Self {
        let num_frames = (duration_secs * sample_rate as f32) as usize;
        let mut samples = Vec::with_capacity(num_frames * 2);

        for i in 0..num_frames {
            let t = i as f32 / sample_rate as f32;
            let s = (2.0 * std::f32::consts::PI * frequency * t).sin();
            samples.push(s);
            samples.push(s);
        }

        Self {
            samples,
            channels: 2,
            sample_rate,
        }
    }

    /// Get a reference to the samples
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Get a mutable reference to the samples
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Get the number of channels
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Get the sample rate
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Get the number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Get the duration in seconds
    pub fn duration(&self) -> f32 {
        self.num_frames() as f32 / self.sample_rate as f32
    }

    /// Get samples for a specific channel (0-indexed)
    pub fn channel_samples(&self, channel: u16) -> Vec<f32> {
        if channel >= self.channels {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(channel as usize)
            .step_by(self.channels as usize)
            .copied()
            .collect()
    }

    /// Apply gain in linear scale
    pub fn apply_gain(&mut self, gain: f32) {
        for sample in &mut self.samples {
            *sample *= gain;
        }
    }

    /// Check if buffers are identical (bit-perfect comparison)
    pub fn is_identical_to(&self, other: &AudioBuffer) -> bool {
        self.channels == other.channels
            && self.sample_rate == other.sample_rate
            && self.samples == other.samples
    }

    /// Check if buffers are approximately equal within tolerance
    pub fn is_approx_equal(&self, other: &AudioBuffer, tolerance: f32) -> bool {
        if self.channels != other.channels || self.sample_rate != other.sample_rate {
            return false;
        }
        if self.samples.len() != other.samples.len() {
            return false;
        }
        self.samples
            .iter()
            .zip(other.samples.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}
