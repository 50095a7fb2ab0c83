//! Audio effects for Aural

mod bass;
mod comb_allpass;
mod reverb;
mod stereo;

pub use bass::BassEnhancer;
pub use comb_allpass::CombAllpassNetwork;
pub use reverb::ReverbEngine;
pub use stereo::StereoShaper;

use crate::format::{FormatError, StreamFormat};

/// Lifecycle state of a processor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessorState {
    /// No valid format yet, or the last format was rejected
    #[default]
    Unconfigured,
    /// Configured, but the parameters make it a pass-through
    Bypassed,
    /// Configured and audibly processing
    Active,
}

/// Trait for audio effects
///
/// Any type implementing this can be placed in a chain. All methods except
/// `configure` and `release` are real-time safe.
pub trait Effect: Send {
    /// Prepare for a stream format, allocating whatever the format needs.
    ///
    /// On error the effect stays unconfigured and passes audio through.
    fn configure(&mut self, format: StreamFormat) -> Result<(), FormatError>;

    /// Check if the effect currently changes the signal
    fn is_active(&self) -> bool;

    /// Process audio samples in place (stereo interleaved)
    fn process(&mut self, samples: &mut [f32]);

    /// Zero all signal history, keeping the configuration
    fn flush(&mut self);

    /// Return to the freshly configured state
    fn reset(&mut self) {
        self.flush();
    }

    /// Drop the configuration and free format-dependent memory
    fn release(&mut self);

    /// Format the effect is configured for, if any
    fn format(&self) -> Option<StreamFormat>;

    /// Get effect name
    fn name(&self) -> &'static str;

    /// Current lifecycle state
    fn state(&self) -> ProcessorState {
        if self.format().is_none() {
            ProcessorState::Unconfigured
        } else if self.is_active() {
            ProcessorState::Active
        } else {
            ProcessorState::Bypassed
        }
    }
}
