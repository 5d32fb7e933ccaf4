//! One-pole recursive filter
//!
//! The simplest IIR filter: one feedback term, 6 dB/octave slope, one
//! multiply-add per sample. Every smoothing, lowpass and band-extraction
//! stage in the effect is built from this recurrence:
//!
//! ```text
//! y[n] = a * x[n] + b * y[n-1]
//! ```
//!
//! Configured either from a cutoff in Hz (`b = exp(-2π·fc/sr)` for lowpass,
//! `b = -exp(-2π·(0.5 - fc/sr))` for highpass) or directly from a smoothing
//! amount `a` in [0,1] the way the cascaded stages share one coefficient.
//! Callers must keep `fc/sr` below 0.5 or the pole leaves the unit circle;
//! the parameter maps upstream guarantee that bound.

/// Single-pole recursive filter
#[derive(Debug, Clone, Copy)]
pub struct OnePole {
    a: f64,
    b: f64,
    z1: f64,
}

impl OnePole {
    /// Identity filter (passes input unchanged)
    pub fn new() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            z1: 0.0,
        }
    }

    /// Create a lowpass with the given cutoff
    pub fn lowpass(cutoff_hz: f64, sample_rate: f64) -> Self {
        let mut filter = Self::new();
        filter.set_lowpass(cutoff_hz, sample_rate);
        filter
    }

    /// Configure as lowpass
    pub fn set_lowpass(&mut self, cutoff_hz: f64, sample_rate: f64) {
        self.b = (-2.0 * std::f64::consts::PI * cutoff_hz / sample_rate).exp();
        self.a = 1.0 - self.b;
    }

    /// Configure as highpass
    pub fn set_highpass(&mut self, cutoff_hz: f64, sample_rate: f64) {
        self.b = -(-2.0 * std::f64::consts::PI * (0.5 - cutoff_hz / sample_rate)).exp();
        self.a = 1.0 + self.b;
    }

    /// Configure directly from a smoothing amount `a` in [0,1]
    /// (`a` = 1 passes through, `a` -> 0 smooths ever harder)
    pub fn set_amount(&mut self, amount: f64) {
        self.a = amount;
        self.b = 1.0 - amount;
    }

    /// Smoothing coefficient `b`
    pub fn coefficient(&self) -> f64 {
        self.b
    }

    /// Process one sample
    #[inline]
    pub fn process(&mut self, x: f64) -> f64 {
        self.z1 = self.a * x + self.b * self.z1;
        self.z1
    }

    /// Clear filter memory
    pub fn reset(&mut self) {
        self.z1 = 0.0;
    }
}

impl Default for OnePole {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_lowpass_step_response() {
        // Driving a unit step through a lowpass approaches 1.0 with
        // per-sample error decaying by the coefficient b.
        let mut filter = OnePole::lowpass(1000.0, 44_100.0);
        let b = filter.coefficient();

        let mut y = 0.0;
        for n in 1..=200 {
            y = filter.process(1.0);
            let expected_error = b.powi(n);
            assert_relative_eq!(1.0 - y, expected_error, epsilon = 1e-9);
        }
        assert!(y > 0.999999);
    }

    #[test]
    fn test_lowpass_passes_dc() {
        let mut filter = OnePole::lowpass(100.0, 44_100.0);
        let mut y = 0.0;
        for _ in 0..20_000 {
            y = filter.process(0.5);
        }
        assert_relative_eq!(y, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_highpass_favors_nyquist_over_dc() {
        let mut filter = OnePole::new();
        filter.set_highpass(11_025.0, 44_100.0);

        // Steady-state DC response is a/(1-b)
        let mut dc = 0.0;
        for _ in 0..10_000 {
            dc = filter.process(1.0);
        }
        let a = 1.0 + filter.coefficient();
        assert_relative_eq!(dc, a / (1.0 - filter.coefficient()), epsilon = 1e-9);

        // A Nyquist-rate alternation passes at full level
        filter.reset();
        let mut peak: f64 = 0.0;
        for i in 0..10_000 {
            let x = if i % 2 == 0 { 1.0 } else { -1.0 };
            let y = filter.process(x);
            if i > 1000 {
                peak = peak.max(y.abs());
            }
        }
        assert!(
            peak > dc.abs() * 1.2,
            "highpass should favor Nyquist ({peak}) over DC ({dc})"
        );
    }

    #[test]
    fn test_amount_form_matches_recurrence() {
        let mut filter = OnePole::new();
        filter.set_amount(0.25);
        // y1 = 0.25*x, y2 = 0.25*x + 0.75*y1
        assert_relative_eq!(filter.process(1.0), 0.25);
        assert_relative_eq!(filter.process(1.0), 0.25 + 0.75 * 0.25);
    }

    #[test]
    fn test_identity_default() {
        let mut filter = OnePole::new();
        assert_eq!(filter.process(0.25), 0.25);
        assert_eq!(filter.process(-0.5), -0.5);
    }

    #[test]
    fn test_reset_clears_memory() {
        let mut filter = OnePole::lowpass(4000.0, 48_000.0);
        filter.process(1.0);
        filter.reset();
        assert_eq!(filter.process(0.0), 0.0);
    }
}
