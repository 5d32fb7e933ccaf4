//! Sub-octave synthesis
//!
//! Derives a signal one octave below the program material from the
//! zero-crossing rate of a band-limited mono driver, then shapes it through
//! two passes of round-robin saturating integrator banks. The three banks
//! update in rotation (one per sample) and cross-blend by a pseudo-random
//! weight each update, which breaks up the periodicity artifacts a single
//! audio-rate integrator would produce in a nonlinear divider.

use crate::dsp::cascade::Cascade;

/// Fixed drive into the head-bump integrator banks
const HEAD_BUMP_DRIVE: f64 = 0.7;

/// Number of residual-extraction stages ahead of the integrator banks
const EXTRACTOR_STAGES: usize = 22;

/// Selects which integrator bank updates on the current sample
///
/// Cycled A -> B -> C -> A by the caller once per sample, whether or not the
/// generator itself runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankPhase {
    A,
    B,
    C,
}

impl BankPhase {
    /// Next phase in the 3-cycle
    pub fn advance(self) -> Self {
        match self {
            BankPhase::A => BankPhase::B,
            BankPhase::B => BankPhase::C,
            BankPhase::C => BankPhase::A,
        }
    }

    fn index(self) -> usize {
        match self {
            BankPhase::A => 0,
            BankPhase::B => 1,
            BankPhase::C => 2,
        }
    }
}

/// Zero-crossing octave divider plus integrator-bank shaping
#[derive(Debug, Clone)]
pub struct OctaveGenerator {
    /// Band-limits the mono driver ahead of the crossing detector
    driver: Cascade<2>,
    /// Rises with signal level, decays in silence; its complement nudges the
    /// integrators toward exact zero when the input goes quiet
    gate: f64,
    was_negative: bool,
    sub_octave: bool,
    /// Strips everything above the lowest band before integration
    extractor: Cascade<EXTRACTOR_STAGES>,
    head_banks: [f64; 3],
    head_shape: Cascade<2>,
    sub_start: Cascade<1>,
    sub_drive: Cascade<2>,
    sub_banks: [f64; 3],
    sub_resample: Cascade<1>,
    sub_smooth: Cascade<2>,
    /// Head-bump coefficient, doubling as the cubic saturation strength
    head_coeff: f64,
}

impl OctaveGenerator {
    pub fn new() -> Self {
        Self {
            driver: Cascade::new(),
            gate: 0.0,
            was_negative: false,
            sub_octave: false,
            extractor: Cascade::new(),
            head_banks: [0.0; 3],
            head_shape: Cascade::new(),
            sub_start: Cascade::new(),
            sub_drive: Cascade::new(),
            sub_banks: [0.0; 3],
            sub_resample: Cascade::new(),
            sub_smooth: Cascade::new(),
            head_coeff: 0.0,
        }
    }

    /// Install the two smoothing coefficients derived from the SubAmount
    /// control and the sample rate
    pub fn configure(&mut self, head_coeff: f64, residual_amount: f64) {
        self.head_coeff = head_coeff;
        self.driver.set_amount(head_coeff);
        self.extractor.set_amount(residual_amount);
        self.head_shape.set_amount(residual_amount);
        self.sub_start.set_amount(residual_amount);
        self.sub_drive.set_amount(head_coeff);
        self.sub_resample.set_amount(head_coeff);
        self.sub_smooth.set_amount(residual_amount);
    }

    /// Synthesize one sub-bump sample from the stereo input
    ///
    /// `blend` is the 0..1 pseudo-random weight for this sample's bank
    /// cross-blend; the caller derives it from the dither register. The
    /// returned value is unscaled — the chain applies the SubGain multiplier.
    pub fn process(&mut self, left: f64, right: f64, phase: BankPhase, blend: f64) -> f64 {
        // The division sharply attenuates the driver so the integrator gain
        // downstream lands back at musical levels.
        let mut lp = (left + right) / 2048.0;
        lp = self.driver.series(lp);

        self.gate += (lp * 10.0).abs();
        self.gate -= 0.001;
        self.gate = self.gate.clamp(0.0, 1.0);
        let zero_nudge = (1.0 - self.gate) * 0.000_01;

        self.track_zero_crossing(lp);

        lp = self.extractor.residual(lp);

        let rand = blend * 0.5;
        let keep = 1.0 - blend;
        let select = phase.index();

        let mut head_bump = update_bank(
            &mut self.head_banks,
            select,
            lp,
            HEAD_BUMP_DRIVE,
            self.head_coeff,
            keep,
            rand,
            zero_nudge,
        );
        head_bump = self.head_shape.residual(head_bump);

        let mut sub_bump = self.sub_start.residual(head_bump);
        sub_bump = self.sub_drive.series(sub_bump);

        // Rectify, then flip per the crossing flag: a square-ish wave at
        // half the driver's fundamental.
        sub_bump = sub_bump.abs();
        if !self.sub_octave {
            sub_bump = -sub_bump;
        }

        sub_bump = update_bank(
            &mut self.sub_banks,
            select,
            sub_bump,
            1.0,
            self.head_coeff,
            keep,
            rand,
            zero_nudge,
        );

        sub_bump = self.sub_resample.series(sub_bump);
        self.sub_smooth.series(sub_bump)
    }

    /// Flip the sub-octave flag on each negative-to-positive crossing
    fn track_zero_crossing(&mut self, lp: f64) {
        if lp > 0.0 {
            if self.was_negative {
                self.sub_octave = !self.sub_octave;
            }
            self.was_negative = false;
        } else {
            self.was_negative = true;
        }
    }

    /// Current state of the half-frequency flag
    pub fn sub_octave_flag(&self) -> bool {
        self.sub_octave
    }

    /// Clear all filter memory, integrators and crossing state
    pub fn reset(&mut self) {
        self.driver.reset();
        self.gate = 0.0;
        self.was_negative = false;
        self.sub_octave = false;
        self.extractor.reset();
        self.head_banks = [0.0; 3];
        self.head_shape.reset();
        self.sub_start.reset();
        self.sub_drive.reset();
        self.sub_banks = [0.0; 3];
        self.sub_resample.reset();
        self.sub_smooth.reset();
    }
}

impl Default for OctaveGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Advance one integrator bank: accumulate, cubic-saturate, cross-blend
/// with the other two banks, then nudge toward zero by the silence clamp
#[allow(clippy::too_many_arguments)]
#[inline]
fn update_bank(
    banks: &mut [f64; 3],
    select: usize,
    input: f64,
    drive: f64,
    saturation: f64,
    keep: f64,
    rand: f64,
    nudge: f64,
) -> f64 {
    let mut value = banks[select] + input * drive;
    value -= value * value * value * saturation;

    let (other_a, other_b) = match select {
        0 => (1, 2),
        1 => (0, 2),
        _ => (0, 1),
    };
    value = keep * value + rand * banks[other_a] + rand * banks[other_b];

    if value > 0.0 {
        value -= nudge;
    } else if value < 0.0 {
        value += nudge;
    }

    banks[select] = value;
    value
}

#[cfg(test)]
mod tests {
    use super::*;

    fn configured() -> OctaveGenerator {
        let mut generator = OctaveGenerator::new();
        // SubAmount 0.5 at 44.1 kHz
        generator.configure(0.07, 0.07 / 44.1);
        generator
    }

    #[test]
    fn test_phase_cycles() {
        let mut phase = BankPhase::A;
        phase = phase.advance();
        assert_eq!(phase, BankPhase::B);
        phase = phase.advance();
        assert_eq!(phase, BankPhase::C);
        phase = phase.advance();
        assert_eq!(phase, BankPhase::A);
    }

    #[test]
    fn test_crossing_flag_halves_rate() {
        let mut generator = OctaveGenerator::new();
        // Driver alternating sign every sample: the flag must alternate
        // every other sample, i.e. at half the crossing rate.
        let mut flags = Vec::new();
        for i in 0..8 {
            let lp = if i % 2 == 0 { -1.0 } else { 1.0 };
            generator.track_zero_crossing(lp);
            flags.push(generator.sub_octave_flag());
        }
        assert_eq!(
            flags,
            vec![false, true, true, false, false, true, true, false]
        );
    }

    #[test]
    fn test_silence_in_stays_near_zero() {
        let mut generator = configured();
        let mut phase = BankPhase::A;
        let mut peak: f64 = 0.0;
        for _ in 0..44_100 {
            let y = generator.process(0.0, 0.0, phase, 0.5);
            phase = phase.advance();
            peak = peak.max(y.abs());
        }
        assert!(peak < 1e-6, "silence produced sub energy: {peak}");
    }

    #[test]
    fn test_sine_produces_bounded_output() {
        let mut generator = configured();
        let mut phase = BankPhase::A;
        let mut peak: f64 = 0.0;
        for i in 0..88_200 {
            let t = i as f64 / 44_100.0;
            let x = (2.0 * std::f64::consts::PI * 100.0 * t).sin();
            let y = generator.process(x, x, phase, 0.5);
            phase = phase.advance();
            assert!(y.is_finite());
            peak = peak.max(y.abs());
        }
        assert!(peak > 1e-5, "sine produced no sub energy");
        assert!(peak < 10.0, "integrators ran away: {peak}");
    }

    #[test]
    fn test_integrators_drain_after_signal_stops() {
        let mut generator = configured();
        let mut phase = BankPhase::A;
        for i in 0..44_100 {
            let t = i as f64 / 44_100.0;
            let x = (2.0 * std::f64::consts::PI * 100.0 * t).sin();
            generator.process(x, x, phase, 0.5);
            phase = phase.advance();
        }
        // Three seconds of silence: the gate opens the clamp and the cubic
        // term bleeds the banks down.
        let mut tail = 0.0;
        for _ in 0..(3 * 44_100) {
            tail = generator.process(0.0, 0.0, phase, 0.5);
            phase = phase.advance();
        }
        assert!(tail.abs() < 1e-3, "integrators failed to drain: {tail}");
    }

    #[test]
    fn test_reset_restores_initial_state() {
        let mut generator = configured();
        let mut phase = BankPhase::A;
        for _ in 0..1000 {
            generator.process(0.5, 0.5, phase, 0.5);
            phase = phase.advance();
        }
        generator.reset();
        assert!(!generator.sub_octave_flag());
        let y = generator.process(0.0, 0.0, BankPhase::A, 0.5);
        assert!(y.abs() < 1e-9);
    }
}
