//! Real-time stereo effects core for Aural
//!
//! This crate transforms interleaved stereo `f32` audio in place:
//! - Filters: one-pole, biquad band-pass, DC blocker, delay line primitives
//! - Effects: stereo shaper, bass enhancer, comb/allpass reverb
//! - Chain: Stereo → Bass → Reverb, with a lock-free control handle
//!
//! Nothing on the per-buffer path allocates, locks or logs. Memory is only
//! allocated in `configure`.

mod chain;
mod effects;
pub mod filters;
mod format;
mod params;

pub use chain::{ChainCommand, ChainHandle, EffectsChain};
pub use effects::{BassEnhancer, CombAllpassNetwork, Effect, ProcessorState, ReverbEngine, StereoShaper};
pub use format::{FormatError, SampleEncoding, StreamFormat, MAX_SAMPLE_RATE, MIN_SAMPLE_RATE};
pub use params::{AtomicParam, BassParams, ProcessorParameters, ReverbParams, StereoParams};
