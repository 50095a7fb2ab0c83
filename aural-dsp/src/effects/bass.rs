//! Bass enhancer
//!
//! Signal flow per channel:
//! ```text
//! in → rumble HPF (20Hz) → clean ─────────────────────────────┐
//!                          └→ bass LPF (100Hz) → punch ─┬──────┤→ mix → tanh → out
//!                                                       └→ x² → DC block ┘
//! ```
//!
//! The punch stage follows the bass envelope (fast attack, slow release) and
//! lifts samples that rise above it, so kick attacks come through harder.
//! Squaring the punched bass adds its second harmonic, which the ear reads
//! as the missing fundamental on small speakers.

use std::sync::Arc;

use tracing::{debug, warn};

use super::Effect;
use crate::filters::{sanitize, soft_limit, DcBlocker, OnePoleHighPass, OnePoleLowPass};
use crate::format::{FormatError, StreamFormat};
use crate::params::BassParams;

/// Subsonic rumble corner
const RUMBLE_HZ: f32 = 20.0;

/// Bass extraction corner
const BASS_HZ: f32 = 100.0;

/// Envelope follower coefficients
const ATTACK: f32 = 0.1;
const RELEASE: f32 = 0.001;

/// Transient gain per unit of envelope overshoot at full strength
const PUNCH_GAIN: f32 = 5.0;

/// Boost scale at full strength
const BOOST_SCALE: f32 = 8.0;

/// Weights of the physical (punched) bass and the phantom harmonics
const PHYSICAL_WEIGHT: f32 = 1.2;
const PHANTOM_WEIGHT: f32 = 0.8;

/// Limiter drive added at full strength
const DRIVE_SCALE: f32 = 0.5;

/// Per-channel state
struct BassChannel {
    rumble: OnePoleHighPass,
    bass: OnePoleLowPass,
    envelope: f32,
    phantom_dc: DcBlocker,
}

impl BassChannel {
    fn new(sample_rate: f32) -> Self {
        Self {
            rumble: OnePoleHighPass::new(sample_rate, RUMBLE_HZ),
            bass: OnePoleLowPass::new(sample_rate, BASS_HZ),
            envelope: 0.0,
            phantom_dc: DcBlocker::default(),
        }
    }

    #[inline]
    fn process(&mut self, input: f32, strength: f32) -> f32 {
        let clean = self.rumble.process(input);
        let low = self.bass.process(clean);

        // Envelope follower on the rectified bass band
        let level = low.abs();
        let coeff = if level > self.envelope { ATTACK } else { RELEASE };
        self.envelope = sanitize(self.envelope + coeff * (level - self.envelope));

        let punch = 1.0 + (level - self.envelope).max(0.0) * PUNCH_GAIN * strength;
        let punched = low * punch;

        // Second harmonic, centered
        let phantom = self.phantom_dc.process(punched * punched);

        let boost = strength * BOOST_SCALE;
        let mixed =
            clean + punched * boost * PHYSICAL_WEIGHT + phantom * boost * PHANTOM_WEIGHT;

        soft_limit(mixed * (1.0 + strength * DRIVE_SCALE))
    }

    fn reset(&mut self) {
        self.rumble.reset();
        self.bass.reset();
        self.envelope = 0.0;
        self.phantom_dc.reset();
    }
}

/// Bass enhancer (rumble filter, punch, phantom bass, limiter)
pub struct BassEnhancer {
    params: Arc<BassParams>,
    format: Option<StreamFormat>,
    channels: Option<[BassChannel; 2]>,
}

impl Default for BassEnhancer {
    fn default() -> Self {
        Self::new()
    }
}

impl BassEnhancer {
    /// Create an unconfigured enhancer at zero strength
    pub fn new() -> Self {
        Self::with_params(Arc::new(BassParams::default()))
    }

    /// Create an enhancer reading from an existing parameter handle
    pub fn with_params(params: Arc<BassParams>) -> Self {
        Self {
            params,
            format: None,
            channels: None,
        }
    }

    /// Shared parameter handle for the control thread
    pub fn params(&self) -> Arc<BassParams> {
        Arc::clone(&self.params)
    }

    /// Set strength (0.0 - 1.0)
    pub fn set_strength(&self, strength: f32) {
        self.params.set_strength(strength);
    }

    /// Get strength
    pub fn strength(&self) -> f32 {
        self.params.strength()
    }
}

impl Effect for BassEnhancer {
    fn configure(&mut self, format: StreamFormat) -> Result<(), FormatError> {
        if let Err(err) = format.validate() {
            warn!(effect = self.name(), %err, "rejecting stream format, bypassing");
            self.release();
            return Err(err);
        }

        let sample_rate = format.sample_rate_f32();
        self.channels = Some([BassChannel::new(sample_rate), BassChannel::new(sample_rate)]);
        self.format = Some(format);
        debug!(effect = self.name(), sample_rate = format.sample_rate, "configured");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.format.is_some() && self.params.strength() > 0.0
    }

    fn process(&mut self, samples: &mut [f32]) {
        if !self.is_active() {
            return;
        }
        let Some([left, right]) = self.channels.as_mut() else {
            return;
        };

        for frame in samples.chunks_exact_mut(2) {
            let strength = self.params.strength();
            frame[0] = left.process(frame[0], strength);
            frame[1] = right.process(frame[1], strength);
        }
    }

    fn flush(&mut self) {
        if let Some(channels) = self.channels.as_mut() {
            for channel in channels {
                channel.reset();
            }
        }
    }

    fn release(&mut self) {
        self.format = None;
        self.channels = None;
    }

    fn format(&self) -> Option<StreamFormat> {
        self.format
    }

    fn name(&self) -> &'static str {
        "BassEnhancer"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ProcessorState;
    use proptest::prelude::*;

    fn configured(strength: f32) -> BassEnhancer {
        let mut bass = BassEnhancer::new();
        bass.configure(StreamFormat::stereo_f32(44100)).unwrap();
        bass.set_strength(strength);
        bass
    }

    fn sine(freq: f32, amplitude: f32, frames: usize) -> Vec<f32> {
        (0..frames)
            .flat_map(|i| {
                let s = (2.0 * std::f32::consts::PI * freq * i as f32 / 44100.0).sin() * amplitude;
                [s, s]
            })
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn test_zero_strength_is_bypassed() {
        let mut bass = configured(0.0);
        assert!(!bass.is_active());
        assert_eq!(bass.state(), ProcessorState::Bypassed);

        let mut samples = sine(60.0, 0.5, 256);
        let original = samples.clone();
        bass.process(&mut samples);
        assert_eq!(samples, original);
    }

    #[test]
    fn test_strength_toggles_active() {
        let bass = configured(0.0);
        bass.set_strength(0.3);
        assert!(bass.is_active());
        assert_eq!(bass.state(), ProcessorState::Active);
        bass.set_strength(0.0);
        assert!(!bass.is_active());
    }

    #[test]
    fn test_silence_in_silence_out() {
        let mut bass = configured(0.5);
        let mut samples = vec![0.0; 200];
        bass.process(&mut samples);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_boosts_low_frequencies_more_than_highs() {
        let mut low_bass = configured(0.5);
        let mut high_bass = configured(0.5);

        let mut low = sine(60.0, 0.1, 44100);
        let mut high = sine(5000.0, 0.1, 44100);
        let low_in = rms(&low);
        let high_in = rms(&high);

        low_bass.process(&mut low);
        high_bass.process(&mut high);

        let low_gain = rms(&low[44100..]) / low_in;
        let high_gain = rms(&high[44100..]) / high_in;
        assert!(low_gain > 2.0, "low gain {}", low_gain);
        assert!(low_gain > high_gain * 1.5, "low {} high {}", low_gain, high_gain);
    }

    #[test]
    fn test_removes_subsonic_offset() {
        let mut bass = configured(1.0);
        let mut samples = vec![0.3; 2 * 44100 * 2];
        bass.process(&mut samples);
        let tail = &samples[samples.len() - 200..];
        assert!(tail.iter().all(|s| s.abs() < 0.01), "dc leaked: {:?}", &tail[..4]);
    }

    #[test]
    fn test_unconfigured_passthrough() {
        let mut bass = BassEnhancer::new();
        bass.set_strength(1.0);
        assert!(!bass.is_active());
        let mut samples = vec![0.4, -0.4];
        bass.process(&mut samples);
        assert_eq!(samples, vec![0.4, -0.4]);
    }

    #[test]
    fn test_flush_idempotent_and_matches_fresh() {
        let mut used = configured(0.7);
        let mut noise = sine(80.0, 0.8, 3000);
        used.process(&mut noise);

        used.flush();
        used.flush();

        let mut fresh = configured(0.7);
        let mut a = vec![0.6, -0.1, 0.2, 0.9];
        let mut b = a.clone();
        used.process(&mut a);
        fresh.process(&mut b);
        assert_eq!(a, b);
    }

    #[test]
    fn test_reset_keeps_configuration() {
        let mut bass = configured(0.4);
        bass.reset();
        assert_eq!(bass.state(), ProcessorState::Active);
        bass.release();
        assert_eq!(bass.state(), ProcessorState::Unconfigured);
    }

    #[test]
    fn test_nan_does_not_stick() {
        let mut bass = configured(1.0);
        let mut samples = vec![f32::NAN, f32::NAN, 0.0, 0.0, 0.1, 0.1];
        bass.process(&mut samples);
        assert!(samples.iter().all(|s| s.is_finite()), "{:?}", samples);
    }

    proptest! {
        #[test]
        fn prop_output_bounded(
            input in proptest::collection::vec(-1.0f32..=1.0, 2..512),
            strength in 0.0f32..=1.0,
        ) {
            let mut bass = configured(strength);
            let mut samples = input;
            bass.process(&mut samples);
            for s in samples {
                prop_assert!(s.abs() <= 1.0, "sample {} out of range", s);
            }
        }
    }
}
