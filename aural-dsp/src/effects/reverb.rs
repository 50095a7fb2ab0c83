//! Reverb engine
//!
//! Wraps the comb/allpass network with a fixed room and a single `amount`
//! control that drives both the dry attenuation and the wet level.

use std::sync::Arc;

use tracing::{debug, warn};

use super::{CombAllpassNetwork, Effect};
use crate::format::{FormatError, StreamFormat};
use crate::params::ReverbParams;

/// Fixed room character
const ROOM_SIZE: f32 = 0.5;
const DAMPING: f32 = 0.5;

/// Input attenuation into the network, prevents buildup in the combs
const INPUT_GAIN: f32 = 0.015;

/// Wet boost so the tail stays audible at moderate amounts
const WET_GAIN: f32 = 1.5;

/// Dry attenuation at full amount
const DRY_DUCK: f32 = 0.5;

/// Stereo reverb effect
pub struct ReverbEngine {
    params: Arc<ReverbParams>,
    format: Option<StreamFormat>,
    network: Option<CombAllpassNetwork>,
}

impl Default for ReverbEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ReverbEngine {
    /// Create an unconfigured, fully dry reverb
    pub fn new() -> Self {
        Self::with_params(Arc::new(ReverbParams::default()))
    }

    /// Create a reverb reading from an existing parameter handle
    pub fn with_params(params: Arc<ReverbParams>) -> Self {
        Self {
            params,
            format: None,
            network: None,
        }
    }

    /// Shared parameter handle for the control thread
    pub fn params(&self) -> Arc<ReverbParams> {
        Arc::clone(&self.params)
    }

    /// Set amount (0.0 - 1.0)
    pub fn set_amount(&self, amount: f32) {
        self.params.set_amount(amount);
    }

    /// Get amount
    pub fn amount(&self) -> f32 {
        self.params.amount()
    }

    /// Longest delay line in samples, 0 when unconfigured
    pub fn tail_length(&self) -> usize {
        self.network
            .as_ref()
            .map_or(0, CombAllpassNetwork::longest_delay)
    }

    /// Dry and wet gains for an amount
    #[inline]
    fn mix_gains(amount: f32) -> (f32, f32) {
        (1.0 - amount * DRY_DUCK, amount * WET_GAIN)
    }
}

impl Effect for ReverbEngine {
    fn configure(&mut self, format: StreamFormat) -> Result<(), FormatError> {
        if let Err(err) = format.validate() {
            warn!(effect = self.name(), %err, "rejecting stream format, bypassing");
            self.release();
            return Err(err);
        }

        let network = CombAllpassNetwork::new(format.sample_rate_f32(), ROOM_SIZE, DAMPING);
        debug!(
            effect = self.name(),
            sample_rate = format.sample_rate,
            longest_delay = network.longest_delay(),
            "configured"
        );
        self.network = Some(network);
        self.format = Some(format);
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.format.is_some() && self.params.amount() > 0.0
    }

    fn process(&mut self, samples: &mut [f32]) {
        if !self.is_active() {
            return;
        }
        let Some(network) = self.network.as_mut() else {
            return;
        };

        for frame in samples.chunks_exact_mut(2) {
            let (dry, wet) = Self::mix_gains(self.params.amount());
            let (in_l, in_r) = (frame[0], frame[1]);

            let feed = (in_l + in_r) * INPUT_GAIN;
            let (out_l, out_r) = network.process(feed);

            frame[0] = in_l * dry + out_l * wet;
            frame[1] = in_r * dry + out_r * wet;
        }
    }

    fn flush(&mut self) {
        if let Some(network) = self.network.as_mut() {
            network.clear();
        }
    }

    fn release(&mut self) {
        self.format = None;
        self.network = None;
    }

    fn format(&self) -> Option<StreamFormat> {
        self.format
    }

    fn name(&self) -> &'static str {
        "ReverbEngine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::ProcessorState;
    use proptest::prelude::*;

    fn configured(amount: f32) -> ReverbEngine {
        let mut reverb = ReverbEngine::new();
        reverb.configure(StreamFormat::stereo_f32(44100)).unwrap();
        reverb.set_amount(amount);
        reverb
    }

    #[test]
    fn test_zero_amount_is_bypassed() {
        let mut reverb = configured(0.0);
        assert_eq!(reverb.state(), ProcessorState::Bypassed);

        let mut samples = vec![0.5, -0.5, 0.3, 0.2];
        let original = samples.clone();
        reverb.process(&mut samples);
        assert_eq!(samples, original);
    }

    #[test]
    fn test_mix_gains() {
        assert_eq!(ReverbEngine::mix_gains(0.0), (1.0, 0.0));
        assert_eq!(ReverbEngine::mix_gains(1.0), (0.5, 1.5));
        let (dry, wet) = ReverbEngine::mix_gains(0.5);
        assert!((dry - 0.75).abs() < 1e-6);
        assert!((wet - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_first_frame_is_dry_only() {
        let mut reverb = configured(1.0);
        let mut samples = vec![0.4, -0.2];
        reverb.process(&mut samples);
        assert!((samples[0] - 0.2).abs() < 1e-6);
        assert!((samples[1] + 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_impulse_tail_decays() {
        let mut reverb = configured(1.0);
        let tail = reverb.tail_length();
        let window = tail * 4;
        let windows = 40;

        let mut samples = vec![0.0; 2 * window * windows];
        samples[0] = 1.0;
        samples[1] = 1.0;
        reverb.process(&mut samples);

        // Window 0 holds the dry impulse and the first echoes
        let levels: Vec<f32> = samples
            .chunks(2 * window)
            .map(|w| (w.iter().map(|s| s * s).sum::<f32>() / w.len() as f32).sqrt())
            .collect();

        assert!(levels[1] > 0.0, "tail should be audible");
        for pair in levels[1..].windows(2) {
            assert!(
                pair[1] <= pair[0] * 1.05,
                "tail grew from {} to {}",
                pair[0],
                pair[1]
            );
        }
        assert!(
            levels[windows - 1] < levels[1] * 1e-3,
            "tail did not decay: start {} end {}",
            levels[1],
            levels[windows - 1]
        );
    }

    #[test]
    fn test_flush_clears_tail() {
        let mut reverb = configured(0.8);
        let mut burst = vec![0.7; 4000];
        reverb.process(&mut burst);

        reverb.flush();
        reverb.flush();

        let mut silence = vec![0.0; 4000];
        reverb.process(&mut silence);
        assert!(silence.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_reconfigure_resizes_delay_lines() {
        let mut reverb = configured(0.5);
        let at_44k = reverb.tail_length();
        reverb.configure(StreamFormat::stereo_f32(96000)).unwrap();
        assert!(reverb.tail_length() > at_44k * 2);

        reverb.release();
        assert_eq!(reverb.tail_length(), 0);
        assert_eq!(reverb.state(), ProcessorState::Unconfigured);
    }

    #[test]
    fn test_absurd_sample_rate_is_rejected_before_allocating() {
        let mut reverb = configured(0.5);
        assert_eq!(
            reverb.configure(StreamFormat::stereo_f32(4_000_000_000)),
            Err(FormatError::SampleRate(4_000_000_000))
        );
        assert_eq!(reverb.tail_length(), 0);
        assert_eq!(reverb.state(), ProcessorState::Unconfigured);
    }

    #[test]
    fn test_loud_peaks_pass_unbent() {
        let mut reverb = configured(0.01);
        let mut samples = vec![0.99, 0.99];
        reverb.process(&mut samples);
        let expected = 0.99 * (1.0 - 0.01 * DRY_DUCK);
        assert!((samples[0] - expected).abs() < 1e-6, "got {}", samples[0]);
        assert!((samples[1] - expected).abs() < 1e-6, "got {}", samples[1]);
    }

    #[test]
    fn test_sustained_full_scale_input_stays_finite() {
        let mut reverb = configured(1.0);
        let mut hot = vec![1.0; 20_000];
        reverb.process(&mut hot);
        assert!(hot.iter().all(|s| s.is_finite()));
    }

    proptest! {
        #[test]
        fn prop_output_follows_mix_formula(
            left in -1.0f32..=1.0,
            right in -1.0f32..=1.0,
            amount in 0.0f32..=1.0,
        ) {
            // A fresh network has no tail yet, so the mix is dry only
            let mut reverb = configured(amount);
            let mut samples = vec![left, right];
            reverb.process(&mut samples);

            let (dry, _) = ReverbEngine::mix_gains(reverb.amount());
            if amount > 0.0 {
                prop_assert_eq!(samples[0], left * dry);
                prop_assert_eq!(samples[1], right * dry);
            } else {
                prop_assert_eq!(samples, vec![left, right]);
            }
        }
    }
}
