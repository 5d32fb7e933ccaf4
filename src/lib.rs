//! Subtone - Sub-Bass Enhancement Effect
//!
//! A stereo per-sample processing chain that synthesizes a sub-octave
//! "bump" beneath the program material, tilts the spectral balance around a
//! split frequency, optionally low-passes the result and applies output
//! gain staging with DC removal and dither.
//!
//! # Architecture
//!
//! - [`dsp`]: the recursive filter network — one-pole primitives, cascaded
//!   smoothers, the octave divider, the tilt EQ and the output stage, all
//!   orchestrated per sample by [`Enhancer`]
//! - [`params`]: the six normalized controls, their engineering-unit
//!   mappings and chunk/preset persistence
//! - [`audio`]: offline buffers, WAV I/O and measurement utilities
//!
//! The audio path never allocates and never panics; coefficient
//! recalculation is gated on parameter change, and parameter writes are
//! serialized against processing by `&mut self`.

pub mod audio;
pub mod dsp;
pub mod error;
pub mod params;

// Re-export commonly used types
pub use audio::AudioBuffer;
pub use dsp::Enhancer;
pub use error::{Result, SubtoneError};
pub use params::{ParamId, Params};
