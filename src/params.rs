//! Control parameters and their engineering-unit mappings
//!
//! All six knobs are stored normalized to 0..1 and clamped on every write
//! path. The mappings to Hz/dB/coefficients live here so the DSP components
//! only ever see engineering units.

use crate::error::{Result, SubtoneError};
use serde::{Deserialize, Serialize};

/// Number of host-visible parameters
pub const PARAM_COUNT: usize = 6;

/// Length of the persisted parameter chunk
pub const CHUNK_LEN: usize = PARAM_COUNT;

/// Reference sample rate the frequency mappings were tuned at
const REFERENCE_RATE: f32 = 44_100.0;

/// Host-visible parameter identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamId {
    /// Sub-octave voicing amount (drives the head-bump frequency)
    SubAmount,
    /// Sub-octave output level
    SubGain,
    /// Tilt EQ balance (0.5 = flat)
    Tilt,
    /// Output lowpass amount (1.0 = fully open)
    Lowpass,
    /// Tilt EQ split frequency
    SplitFreq,
    /// Output trim (+/-18 dB, 0.5 = unity)
    OutputGain,
}

impl ParamId {
    /// All parameters in index order
    pub const ALL: [ParamId; PARAM_COUNT] = [
        ParamId::SubAmount,
        ParamId::SubGain,
        ParamId::Tilt,
        ParamId::Lowpass,
        ParamId::SplitFreq,
        ParamId::OutputGain,
    ];

    /// Resolve a raw host index to a parameter id
    ///
    /// Out-of-range indices are a typed error, never a panic.
    pub fn from_index(index: usize) -> Result<ParamId> {
        Self::ALL
            .get(index)
            .copied()
            .ok_or(SubtoneError::InvalidParameter {
                index,
                count: PARAM_COUNT,
            })
    }

    /// Stable index of this parameter
    pub fn index(self) -> usize {
        Self::ALL.iter().position(|&p| p == self).unwrap_or(0)
    }

    /// Short display name
    pub fn name(self) -> &'static str {
        match self {
            ParamId::SubAmount => "SubAmount",
            ParamId::SubGain => "SubGain",
            ParamId::Tilt => "Tilt",
            ParamId::Lowpass => "Lowpass",
            ParamId::SplitFreq => "SplitFreq",
            ParamId::OutputGain => "OutGain",
        }
    }

    /// Unit label for display ("dB", "Hz", or empty)
    pub fn label(self) -> &'static str {
        match self {
            ParamId::Tilt | ParamId::OutputGain => "dB",
            ParamId::SplitFreq => "Hz",
            _ => "",
        }
    }
}

/// The six normalized control values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Params {
    pub sub_amount: f32,
    pub sub_gain: f32,
    pub tilt: f32,
    pub lowpass: f32,
    pub split_freq: f32,
    pub output_gain: f32,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            sub_amount: 0.0,
            sub_gain: 0.0,
            tilt: 0.5,
            lowpass: 1.0,
            split_freq: 0.4,
            output_gain: 0.5,
        }
    }
}

impl Params {
    /// Set a parameter, clamping the value to 0..1 (NaN becomes 0)
    pub fn set(&mut self, id: ParamId, value: f32) {
        let value = pin(value);
        match id {
            ParamId::SubAmount => self.sub_amount = value,
            ParamId::SubGain => self.sub_gain = value,
            ParamId::Tilt => self.tilt = value,
            ParamId::Lowpass => self.lowpass = value,
            ParamId::SplitFreq => self.split_freq = value,
            ParamId::OutputGain => self.output_gain = value,
        }
    }

    /// Get the normalized value of a parameter
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::SubAmount => self.sub_amount,
            ParamId::SubGain => self.sub_gain,
            ParamId::Tilt => self.tilt,
            ParamId::Lowpass => self.lowpass,
            ParamId::SplitFreq => self.split_freq,
            ParamId::OutputGain => self.output_gain,
        }
    }

    // ------------------------------------------------------------------
    // Engineering-unit mappings
    // ------------------------------------------------------------------

    /// Head-bump smoothing coefficient (cycles/sample scale, rate-compensated)
    ///
    /// Tuned at 44.1 kHz; higher sample rates narrow the coefficient so the
    /// synthesized band stays at the same audible frequency.
    pub fn head_bump_coeff(&self, sample_rate: f32) -> f64 {
        ((self.sub_amount as f64 * 0.1) + 0.02) * (REFERENCE_RATE as f64 / sample_rate as f64)
    }

    /// Residual-cascade smoothing amount (the band-extraction coefficient)
    pub fn residual_amount(&self, sample_rate: f32) -> f64 {
        self.head_bump_coeff(sample_rate) / 44.1
    }

    /// Linear multiplier applied to the synthesized sub signal
    pub fn sub_out_gain(&self) -> f64 {
        self.sub_gain as f64 * 24.0
    }

    /// Tilt balance in dB (-6..+6, 0 = flat)
    pub fn tilt_gain_db(&self) -> f64 {
        (self.tilt as f64 * 12.0) - 6.0
    }

    /// Tilt EQ split frequency in Hz (30..800, square-law taper)
    pub fn split_frequency_hz(&self) -> f64 {
        (self.split_freq as f64 * self.split_freq as f64 * 770.0) + 30.0
    }

    /// Output lowpass smoothing amount; 1.0 means the stage is bypassed
    pub fn lowpass_amount(&self) -> f64 {
        (4.0 * self.lowpass as f64 * self.lowpass as f64).min(1.0)
    }

    /// Whether the output lowpass should run at all
    pub fn lowpass_engaged(&self) -> bool {
        self.lowpass < 1.0
    }

    /// Output trim as a linear multiplier (0..1 maps to -18..+18 dB)
    pub fn output_gain_linear(&self) -> f64 {
        10.0_f64.powf(((self.output_gain as f64 * 36.0) - 18.0) / 20.0)
    }

    /// Whether the sub-octave generator should run at all
    pub fn sub_engaged(&self) -> bool {
        self.sub_amount > 0.0 && self.sub_gain > 0.0
    }

    /// Whether the tilt EQ should run at all (0 dB balance bypasses it)
    pub fn tilt_engaged(&self) -> bool {
        self.tilt_gain_db() != 0.0
    }

    /// Human-readable value of a parameter in engineering units
    pub fn display_value(&self, id: ParamId) -> String {
        match id {
            ParamId::SubAmount => format!("{:.4}", self.sub_amount),
            ParamId::SubGain => format!("x{:.2}", self.sub_out_gain()),
            ParamId::Tilt => format!("{:.1} dB", self.tilt_gain_db()),
            ParamId::Lowpass => format!("{:.4}", self.lowpass),
            ParamId::SplitFreq => format!("{:.0} Hz", self.split_frequency_hz().floor()),
            ParamId::OutputGain => {
                format!("{:.2} dB", (self.output_gain * 36.0) - 18.0)
            }
        }
    }

    // ------------------------------------------------------------------
    // Persistence (host chunk)
    // ------------------------------------------------------------------

    /// Serialize the raw parameter values in the fixed chunk field order
    pub fn to_chunk(&self) -> [f32; CHUNK_LEN] {
        [
            self.sub_amount,
            self.sub_gain,
            self.lowpass,
            self.tilt,
            self.split_freq,
            self.output_gain,
        ]
    }

    /// Restore parameters from a chunk, clamping every field
    ///
    /// Short chunks leave the remaining fields untouched and extra floats are
    /// ignored; reported lengths are never trusted.
    pub fn load_chunk(&mut self, chunk: &[f32]) {
        let slots: [&mut f32; CHUNK_LEN] = [
            &mut self.sub_amount,
            &mut self.sub_gain,
            &mut self.lowpass,
            &mut self.tilt,
            &mut self.split_freq,
            &mut self.output_gain,
        ];
        for (slot, &value) in slots.into_iter().zip(chunk.iter()) {
            *slot = pin(value);
        }
    }
}

/// Clamp a persisted value into the normalized range, mapping NaN to 0
fn pin(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let params = Params::default();
        assert_eq!(params.sub_amount, 0.0);
        assert_eq!(params.tilt, 0.5);
        assert_eq!(params.lowpass, 1.0);
        assert_eq!(params.split_freq, 0.4);
        assert_eq!(params.output_gain, 0.5);
    }

    #[test]
    fn test_set_get_round_trip() {
        let mut params = Params::default();
        for (i, id) in ParamId::ALL.into_iter().enumerate() {
            let value = i as f32 / 10.0;
            params.set(id, value);
            assert_eq!(params.get(id), value);
        }
    }

    #[test_case(-0.5, 0.0 ; "below range clamps to zero")]
    #[test_case(1.5, 1.0 ; "above range clamps to one")]
    #[test_case(0.25, 0.25 ; "in range passes through")]
    fn test_set_clamps(input: f32, expected: f32) {
        let mut params = Params::default();
        params.set(ParamId::SubAmount, input);
        assert_eq!(params.sub_amount, expected);
    }

    #[test]
    fn test_from_index() {
        assert_eq!(ParamId::from_index(0).unwrap(), ParamId::SubAmount);
        assert_eq!(ParamId::from_index(5).unwrap(), ParamId::OutputGain);
        assert!(ParamId::from_index(6).is_err());
    }

    #[test]
    fn test_index_round_trip() {
        for id in ParamId::ALL {
            assert_eq!(ParamId::from_index(id.index()).unwrap(), id);
        }
    }

    #[test]
    fn test_split_frequency_range() {
        let mut params = Params::default();
        params.set(ParamId::SplitFreq, 0.0);
        assert_relative_eq!(params.split_frequency_hz(), 30.0);
        params.set(ParamId::SplitFreq, 1.0);
        assert_relative_eq!(params.split_frequency_hz(), 800.0);
    }

    #[test]
    fn test_output_gain_mapping() {
        let mut params = Params::default();
        // 0.5 maps to 0 dB = unity
        assert_relative_eq!(params.output_gain_linear(), 1.0, epsilon = 1e-12);
        params.set(ParamId::OutputGain, 1.0);
        // +18 dB
        assert_relative_eq!(params.output_gain_linear(), 7.943282347, epsilon = 1e-6);
        params.set(ParamId::OutputGain, 0.0);
        // -18 dB
        assert_relative_eq!(params.output_gain_linear(), 0.1258925412, epsilon = 1e-9);
    }

    #[test]
    fn test_head_bump_coeff_rate_compensation() {
        let params = Params {
            sub_amount: 0.5,
            ..Default::default()
        };
        let at_44k = params.head_bump_coeff(44_100.0);
        let at_88k = params.head_bump_coeff(88_200.0);
        assert_relative_eq!(at_44k, 0.07, epsilon = 1e-9);
        assert_relative_eq!(at_88k, at_44k / 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_lowpass_engagement() {
        let mut params = Params::default();
        assert!(!params.lowpass_engaged());
        params.set(ParamId::Lowpass, 0.99);
        assert!(params.lowpass_engaged());
        // amount saturates at 1.0 above the halfway point
        params.set(ParamId::Lowpass, 0.6);
        assert_relative_eq!(params.lowpass_amount(), 1.0);
        params.set(ParamId::Lowpass, 0.25);
        assert_relative_eq!(params.lowpass_amount(), 0.25);
    }

    #[test]
    fn test_tilt_engagement() {
        let mut params = Params::default();
        assert!(!params.tilt_engaged());
        params.set(ParamId::Tilt, 0.6);
        assert!(params.tilt_engaged());
    }

    #[test]
    fn test_chunk_round_trip() {
        let mut params = Params::default();
        params.set(ParamId::SubAmount, 0.3);
        params.set(ParamId::SubGain, 0.7);
        params.set(ParamId::Tilt, 0.25);
        params.set(ParamId::Lowpass, 0.9);
        params.set(ParamId::SplitFreq, 0.1);
        params.set(ParamId::OutputGain, 0.6);

        let chunk = params.to_chunk();
        let mut restored = Params::default();
        restored.load_chunk(&chunk);

        assert_eq!(params, restored);
    }

    #[test]
    fn test_chunk_clamps_and_tolerates_length() {
        let mut params = Params::default();
        // Hostile chunk: out of range, NaN, and too short
        params.load_chunk(&[2.0, -1.0, f32::NAN]);
        assert_eq!(params.sub_amount, 1.0);
        assert_eq!(params.sub_gain, 0.0);
        assert_eq!(params.lowpass, 0.0);
        // untouched fields keep their previous values
        assert_eq!(params.tilt, 0.5);
        assert_eq!(params.split_freq, 0.4);

        // Over-long chunk: extras ignored
        let mut params = Params::default();
        params.load_chunk(&[0.1; 12]);
        assert_eq!(params.output_gain, 0.1);
    }

    #[test]
    fn test_preset_json_round_trip() {
        let mut params = Params::default();
        params.set(ParamId::SubGain, 0.42);
        let json = serde_json::to_string(&params).unwrap();
        let restored: Params = serde_json::from_str(&json).unwrap();
        assert_eq!(params, restored);
    }

    #[test]
    fn test_display_values() {
        let params = Params::default();
        assert_eq!(params.display_value(ParamId::Tilt), "0.0 dB");
        assert_eq!(params.display_value(ParamId::SplitFreq), "153 Hz");
        assert_eq!(params.display_value(ParamId::OutputGain), "0.00 dB");
    }
}
