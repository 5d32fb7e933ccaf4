//! Audio verification utilities
//!
//! Objective measurements for audio quality testing without manual
//! listening: level statistics, DC offset, clipping detection, and FFT
//! spectral analysis.

use crate::audio::AudioBuffer;
use rustfft::{num_complex::Complex, FftPlanner};

/// Threshold for considering a sample as clipped (at digital maximum)
const CLIP_THRESHOLD: f32 = 0.9999;

/// Convert linear amplitude to decibels
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Convert decibels to linear amplitude
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Calculate RMS (Root Mean Square) of samples
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f32 = samples.iter().map(|s| s * s).sum();
    (sum_squares / samples.len() as f32).sqrt()
}

/// Calculate RMS in decibels
pub fn calculate_rms_db(samples: &[f32]) -> f32 {
    linear_to_db(calculate_rms(samples))
}

/// Calculate peak (maximum absolute value) of samples
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

/// Calculate DC offset (mean of samples)
pub fn calculate_dc_offset(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f32 = samples.iter().sum();
    sum / samples.len() as f32
}

/// Count samples that are clipped (at or near digital maximum)
pub fn count_clipped_samples(samples: &[f32]) -> usize {
    samples.iter().filter(|s| s.abs() >= CLIP_THRESHOLD).count()
}

/// Level summary printed by the CLI after processing
#[derive(Debug, Clone)]
pub struct AudioAnalysis {
    pub rms_db: f32,
    pub peak_db: f32,
    pub dc_offset: f32,
    pub clipped_samples: usize,
    pub duration: f32,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioAnalysis {
    /// Analyze an audio buffer
    pub fn analyze(buffer: &AudioBuffer) -> Self {
        let samples = buffer.samples();
        Self {
            rms_db: calculate_rms_db(samples),
            peak_db: linear_to_db(calculate_peak(samples)),
            dc_offset: calculate_dc_offset(samples),
            clipped_samples: count_clipped_samples(samples),
            duration: buffer.duration(),
            sample_rate: buffer.sample_rate(),
            channels: buffer.channels(),
        }
    }

    /// Generate a summary string for display
    pub fn summary(&self) -> String {
        let mut s = format!(
            "Duration: {:.2}s | {} ch @ {} Hz\n\
             RMS: {:.1} dBFS | Peak: {:.1} dBFS | DC Offset: {:.5}",
            self.duration, self.channels, self.sample_rate, self.rms_db, self.peak_db,
            self.dc_offset
        );
        if self.clipped_samples > 0 {
            s.push_str(&format!("\nClipping: {} samples", self.clipped_samples));
        }
        s
    }
}

/// Spectral magnitude at one FFT bin
#[derive(Debug, Clone)]
pub struct SpectralPeak {
    pub frequency: f32,
    pub magnitude_db: f32,
}

/// Perform FFT analysis and return the magnitude spectrum
///
/// Stereo input is mixed to mono first; a Hann window is applied over the
/// first `fft_size` samples.
pub fn analyze_spectrum(buffer: &AudioBuffer, fft_size: usize) -> Vec<SpectralPeak> {
    let samples = if buffer.channels() == 2 {
        buffer
            .channel_samples(0)
            .iter()
            .zip(buffer.channel_samples(1).iter())
            .map(|(l, r)| (l + r) / 2.0)
            .collect::<Vec<_>>()
    } else {
        buffer.samples().to_vec()
    };

    if samples.len() < fft_size {
        return Vec::new();
    }

    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(fft_size);

    let mut complex_samples: Vec<Complex<f32>> = samples
        .iter()
        .take(fft_size)
        .enumerate()
        .map(|(i, &s)| {
            let window =
                0.5 * (1.0 - (2.0 * std::f32::consts::PI * i as f32 / fft_size as f32).cos());
            Complex::new(s * window, 0.0)
        })
        .collect();

    fft.process(&mut complex_samples);

    let bin_hz = buffer.sample_rate() as f32 / fft_size as f32;

    complex_samples
        .iter()
        .take(fft_size / 2)
        .enumerate()
        .map(|(i, c)| {
            let magnitude = c.norm() / (fft_size as f32 / 2.0);
            SpectralPeak {
                frequency: i as f32 * bin_hz,
                magnitude_db: linear_to_db(magnitude),
            }
        })
        .collect()
}

/// Get magnitude in dB at a specific frequency (nearest bin)
pub fn magnitude_at_frequency(buffer: &AudioBuffer, frequency: f32, fft_size: usize) -> f32 {
    let spectrum = analyze_spectrum(buffer, fft_size);
    let bin_hz = buffer.sample_rate() as f32 / fft_size as f32;
    let target_bin = (frequency / bin_hz).round() as usize;

    spectrum
        .get(target_bin)
        .map(|p| p.magnitude_db)
        .unwrap_or(f32::NEG_INFINITY)
}

/// Frequency of the strongest bin within [low_hz, high_hz]
pub fn dominant_frequency(
    buffer: &AudioBuffer,
    low_hz: f32,
    high_hz: f32,
    fft_size: usize,
) -> Option<f32> {
    analyze_spectrum(buffer, fft_size)
        .into_iter()
        .filter(|p| p.frequency >= low_hz && p.frequency <= high_hz)
        .max_by(|a, b| a.magnitude_db.total_cmp(&b.magnitude_db))
        .map(|p| p.frequency)
}
