//! The complete sub-bass enhancement chain
//!
//! Per-sample order: denormal guard -> sub-octave synthesis -> tilt EQ ->
//! output lowpass -> DC block -> output trim -> dither. The enhancer owns
//! every piece of recursive filter state, the 3-phase bank selector and the
//! per-channel dither registers; left and right keep independent memories
//! except for the intentional L+R mono sub driver.
//!
//! Parameter updates and audio processing are serialized by ownership: all
//! setters take `&mut self`, so a host cannot race a write against a running
//! block. Derived coefficients are refreshed at block start, and only for
//! parameters whose control value actually changed.

use crate::audio::AudioBuffer;
use crate::dsp::cascade::OutputLowpass;
use crate::dsp::octave::{BankPhase, OctaveGenerator};
use crate::dsp::output::OutputStage;
use crate::dsp::random::Fpd;
use crate::dsp::tilt::TiltEq;
use crate::error::{Result, SubtoneError};
use crate::params::{ParamId, Params, CHUNK_LEN};
use log::{debug, info};

/// Sentinel forcing a coefficient refresh; real controls live in 0..1
const DIRTY: f32 = -1.0;

/// Dither register seeds (left/right); any nonzero values work, fixed ones
/// keep runs reproducible
const FPD_SEED_L: u32 = 0x1B2E_C3A5;
const FPD_SEED_R: u32 = 0x6C8F_95D3;

/// Which stages run this block; derived from the parameter snapshot
#[derive(Debug, Clone, Copy)]
struct Engagement {
    sub: bool,
    tilt: bool,
    lowpass: bool,
    /// Any coloring stage active: gates the DC blocker
    coloring: bool,
}

/// Stereo sub-bass enhancement effect
#[derive(Debug, Clone)]
pub struct Enhancer {
    params: Params,
    sample_rate: f32,
    octave: OctaveGenerator,
    tilt: TiltEq,
    lowpass_l: OutputLowpass,
    lowpass_r: OutputLowpass,
    output: OutputStage,
    phase: BankPhase,
    fpd_l: Fpd,
    fpd_r: Fpd,
    sub_out_gain: f64,
    prev_sub_amount: f32,
    prev_sub_gain: f32,
    prev_lowpass: f32,
    prev_output_gain: f32,
}

impl Enhancer {
    /// Create an enhancer at the default 44.1 kHz rate
    pub fn new() -> Self {
        Self {
            params: Params::default(),
            sample_rate: 44_100.0,
            octave: OctaveGenerator::new(),
            tilt: TiltEq::new(),
            lowpass_l: OutputLowpass::new(),
            lowpass_r: OutputLowpass::new(),
            output: OutputStage::new(),
            phase: BankPhase::A,
            fpd_l: Fpd::new(FPD_SEED_L),
            fpd_r: Fpd::new(FPD_SEED_R),
            sub_out_gain: 0.0,
            prev_sub_amount: DIRTY,
            prev_sub_gain: DIRTY,
            prev_lowpass: DIRTY,
            prev_output_gain: DIRTY,
        }
    }

    /// Set the host sample rate and invalidate all cached coefficients
    ///
    /// Must be called whenever the host rate changes; construction assumes
    /// 44.1 kHz until then.
    pub fn configure(&mut self, sample_rate: f32) {
        self.sample_rate = sample_rate;
        self.prev_sub_amount = DIRTY;
        self.prev_sub_gain = DIRTY;
        self.prev_lowpass = DIRTY;
        self.prev_output_gain = DIRTY;
        self.tilt.invalidate();
        info!("configured for {sample_rate} Hz");
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Set a normalized parameter (clamped to 0..1)
    pub fn set_parameter(&mut self, id: ParamId, value: f32) {
        self.params.set(id, value);
    }

    /// Get a normalized parameter
    pub fn parameter(&self, id: ParamId) -> f32 {
        self.params.get(id)
    }

    /// Current parameter snapshot
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Replace the whole parameter snapshot (each value clamped)
    pub fn set_params(&mut self, params: Params) {
        for id in ParamId::ALL {
            self.params.set(id, params.get(id));
        }
    }

    /// Persist the raw parameter values ("chunk")
    pub fn save_chunk(&self) -> [f32; CHUNK_LEN] {
        self.params.to_chunk()
    }

    /// Restore parameters from a persisted chunk; every value is clamped
    /// and the length is never trusted
    pub fn load_chunk(&mut self, chunk: &[f32]) {
        self.params.load_chunk(chunk);
    }

    /// Restore all run-time state to its construction value (the parameter
    /// snapshot survives); exposed for testability
    pub fn reset(&mut self) {
        self.octave.reset();
        self.tilt.reset();
        self.lowpass_l.reset();
        self.lowpass_r.reset();
        self.output.reset();
        self.phase = BankPhase::A;
        self.fpd_l = Fpd::new(FPD_SEED_L);
        self.fpd_r = Fpd::new(FPD_SEED_R);
    }

    /// Process a stereo block in place
    ///
    /// The transform is in place, so host-side `inputs == outputs` aliasing
    /// is the normal case. Left/right length mismatch is a typed error.
    pub fn process_block(&mut self, left: &mut [f32], right: &mut [f32]) -> Result<()> {
        if left.len() != right.len() {
            return Err(SubtoneError::BlockLengthMismatch {
                left: left.len(),
                right: right.len(),
            });
        }

        let engagement = self.refresh_coefficients();
        for (l, r) in left.iter_mut().zip(right.iter_mut()) {
            let (out_l, out_r) = self.tick(*l, *r, engagement);
            *l = out_l;
            *r = out_r;
        }
        Ok(())
    }

    /// Process an interleaved mono or stereo buffer in place
    ///
    /// Mono input drives both internal channels with the same signal and
    /// keeps the left result. More than two channels is a typed error.
    pub fn process_buffer(&mut self, buffer: &mut AudioBuffer) -> Result<()> {
        let engagement = self.refresh_coefficients();
        match buffer.channels() {
            1 => {
                for sample in buffer.samples_mut() {
                    let (l, _) = self.tick(*sample, *sample, engagement);
                    *sample = l;
                }
                Ok(())
            }
            2 => {
                for frame in buffer.samples_mut().chunks_exact_mut(2) {
                    let (l, r) = self.tick(frame[0], frame[1], engagement);
                    frame[0] = l;
                    frame[1] = r;
                }
                Ok(())
            }
            channels => Err(SubtoneError::ChannelMismatch { channels }),
        }
    }

    /// Refresh cached coefficients for any control that moved since the
    /// last block, and report which stages run
    fn refresh_coefficients(&mut self) -> Engagement {
        if self.params.sub_amount != self.prev_sub_amount {
            self.octave.configure(
                self.params.head_bump_coeff(self.sample_rate),
                self.params.residual_amount(self.sample_rate),
            );
            self.prev_sub_amount = self.params.sub_amount;
            debug!(
                "sub coefficients: head bump {:.5}, residual {:.7}",
                self.params.head_bump_coeff(self.sample_rate),
                self.params.residual_amount(self.sample_rate)
            );
        }
        if self.params.sub_gain != self.prev_sub_gain {
            self.sub_out_gain = self.params.sub_out_gain();
            self.prev_sub_gain = self.params.sub_gain;
        }
        if self.params.lowpass != self.prev_lowpass {
            let amount = self.params.lowpass_amount();
            self.lowpass_l.set_amount(amount);
            self.lowpass_r.set_amount(amount);
            self.prev_lowpass = self.params.lowpass;
        }
        if self.params.output_gain != self.prev_output_gain {
            self.output.set_gain(self.params.output_gain_linear());
            self.prev_output_gain = self.params.output_gain;
        }
        self.tilt.configure(
            self.params.split_freq,
            self.params.tilt,
            self.sample_rate as f64,
        );

        let sub = self.params.sub_engaged();
        let tilt = self.params.tilt_engaged();
        let lowpass = self.params.lowpass_engaged();
        Engagement {
            sub,
            tilt,
            lowpass,
            coloring: sub || tilt || lowpass,
        }
    }

    /// Process one stereo frame
    #[inline]
    fn tick(&mut self, left: f32, right: f32, engagement: Engagement) -> (f32, f32) {
        let mut l = self.fpd_l.guard_denormal(left as f64);
        let mut r = self.fpd_r.guard_denormal(right as f64);

        if engagement.sub {
            let sub = self.octave.process(l, r, self.phase, self.fpd_l.unit());
            l += sub * self.sub_out_gain;
            r += sub * self.sub_out_gain;
        }
        // The selector rotates every sample, engaged or not, so toggling the
        // sub section never stalls the de-correlation pattern.
        self.phase = self.phase.advance();

        if engagement.tilt {
            l = self.fpd_l.guard_denormal(l);
            r = self.fpd_r.guard_denormal(r);
            let (tl, tr) = self.tilt.process(l, r);
            l = tl;
            r = tr;
        }

        if engagement.lowpass {
            l = self.lowpass_l.process(l);
            r = self.lowpass_r.process(r);
        }

        let (l, r) = self
            .output
            .process(l, r, engagement.coloring, &mut self.fpd_l, &mut self.fpd_r);
        (l as f32, r as f32)
    }
}

impl Default for Enhancer {
    fn default() -> Self {
        Self::new()
    }
}
