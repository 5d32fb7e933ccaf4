//! Tilt equalizer
//!
//! A single one-pole corner filter whose output is mixed back against the
//! dry signal with complementary low/high gains, pivoting the spectral
//! balance around a split frequency. Coefficients are recomputed only when
//! the governing controls actually change; the controls are compared after
//! rounding to three decimals so float noise on a parameter line cannot
//! trigger recomputation every block.

use log::debug;

/// Tiny constant bias keeping the corner filter out of denormal range
const DENORM_BIAS: f64 = 1.0 / 4_294_967_295.0;

/// Low-side weighting factor: cuts on the bass side run 5x deeper
const LOW_SIDE_FACTOR: f64 = 5.0;

/// Tilt/shelf equalizer with cached coefficients
#[derive(Debug, Clone)]
pub struct TiltEq {
    last_split_control: f64,
    last_tilt_control: f64,
    a0: f64,
    b1: f64,
    low_gain: f64,
    high_gain: f64,
    lp_l: f64,
    lp_r: f64,
}

impl TiltEq {
    pub fn new() -> Self {
        Self {
            last_split_control: -1.0,
            last_tilt_control: -1.0,
            a0: 0.0,
            b1: 0.0,
            low_gain: 0.0,
            high_gain: 0.0,
            lp_l: 0.0,
            lp_r: 0.0,
        }
    }

    /// Recompute coefficients if the split-frequency or balance control
    /// moved (3-decimal comparison)
    pub fn configure(&mut self, split_control: f32, tilt_control: f32, sample_rate: f64) {
        let split = round3(split_control as f64);
        let tilt = round3(tilt_control as f64);
        if split == self.last_split_control && tilt == self.last_tilt_control {
            return;
        }

        let balance_db = (tilt * 12.0) - 6.0;
        let filter_amp = 6.0 / std::f64::consts::LN_2;

        // Both signs weight the low side by the fixed factor; the high side
        // carries the raw balance.
        let low_target = -balance_db * LOW_SIDE_FACTOR;
        let high_target = balance_db;
        self.low_gain = (low_target / filter_amp).exp() - 1.0;
        self.high_gain = (high_target / filter_amp).exp() - 1.0;

        let split_hz = (split * split * 770.0) + 30.0;
        let omega = 2.0 * std::f64::consts::PI * split_hz;
        let n = 1.0 / (3.0 * sample_rate + omega);
        self.a0 = 2.0 * omega * n;
        self.b1 = (3.0 * sample_rate - omega) * n;

        self.last_split_control = split;
        self.last_tilt_control = tilt;
        debug!(
            "tilt coefficients: split {:.0} Hz, balance {:+.1} dB",
            split_hz, balance_db
        );
    }

    /// Drop the cached controls so the next configure recomputes
    /// (sample-rate changes)
    pub fn invalidate(&mut self) {
        self.last_split_control = -1.0;
        self.last_tilt_control = -1.0;
    }

    /// Process one stereo sample pair
    #[inline]
    pub fn process(&mut self, left: f64, right: f64) -> (f64, f64) {
        self.lp_l = self.a0 * left + self.b1 * self.lp_l;
        let out_l =
            left + self.low_gain * self.lp_l + self.high_gain * (left - self.lp_l) + DENORM_BIAS;

        self.lp_r = self.a0 * right + self.b1 * self.lp_r;
        let out_r =
            right + self.low_gain * self.lp_r + self.high_gain * (right - self.lp_r) + DENORM_BIAS;

        (out_l, out_r)
    }

    /// Clear corner-filter memory (coefficient cache survives)
    pub fn reset(&mut self) {
        self.lp_l = 0.0;
        self.lp_r = 0.0;
    }

    #[cfg(test)]
    fn coefficients(&self) -> (f64, f64) {
        (self.a0, self.b1)
    }
}

impl Default for TiltEq {
    fn default() -> Self {
        Self::new()
    }
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}
