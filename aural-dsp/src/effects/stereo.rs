//! Stereo shaper with M/S processing
//!
//! Features:
//! - Mid/Side encoding for width control, with the bass kept close to mono
//! - Clarity: quiet side-detail boost, vocal presence, air excitation, tube warmth
//! - Binaural crossfeed (head shadow) while clarity is engaged
//! - Balance and a final tanh soft limiter
//!
//! Parameters:
//! - Balance: -1.0 (left) to 1.0 (right), default 0.0
//! - Width: 0.0 (mono) to 2.0 (wide), default 1.0
//! - Clarity: 0.0 to 1.0, default 0.0
//!
//! With all three at their defaults the shaper is bypassed and the signal is
//! returned untouched.

use std::sync::Arc;

use tracing::{debug, warn};

use super::Effect;
use crate::filters::{soft_limit, BiquadCoeffs, BiquadState, DcBlocker, OnePoleLowPass};
use crate::format::{FormatError, StreamFormat};
use crate::params::StereoParams;

/// Side-channel crossover between mono-ish bass and widened highs
const CROSSOVER_HZ: f32 = 300.0;

/// Air band extraction corner
const AIR_HZ: f32 = 10_000.0;

/// Vocal presence band
const PRESENCE_HZ: f32 = 3_000.0;
const PRESENCE_Q: f32 = 0.5;

/// Head-shadow low-pass for binaural crossfeed. Gives a smoothing
/// coefficient of about 0.08 at 44.1kHz and keeps the corner fixed at other
/// rates.
const HEAD_SHADOW_HZ: f32 = 600.0;

/// Fraction of the shadowed opposite channel fed across
const CROSSFEED_AMOUNT: f32 = 0.15;

/// High-band gain on top of the width factor when widening
const WIDEN_HIGH_GAIN: f32 = 1.2;

/// Clarity gain multipliers
const DETAIL_GAIN: f32 = 4.0;
const VOCAL_MID_GAIN: f32 = 1.5;
const VOCAL_SIDE_GAIN: f32 = 1.2;
const AIR_GAIN: f32 = 2.5;
const TUBE_WARMTH: f32 = 0.25;

/// Per-stream filter bank, rebuilt on every configure
struct ShaperFilters {
    side_crossover: OnePoleLowPass,
    air: OnePoleLowPass,
    presence: BiquadCoeffs,
    vocal_mid: BiquadState,
    vocal_side: BiquadState,
    tube_dc: DcBlocker,
    shadow_l: OnePoleLowPass,
    shadow_r: OnePoleLowPass,
}

impl ShaperFilters {
    fn new(sample_rate: f32) -> Self {
        Self {
            side_crossover: OnePoleLowPass::new(sample_rate, CROSSOVER_HZ),
            air: OnePoleLowPass::new(sample_rate, AIR_HZ),
            presence: BiquadCoeffs::band_pass(sample_rate, PRESENCE_HZ, PRESENCE_Q),
            vocal_mid: BiquadState::default(),
            vocal_side: BiquadState::default(),
            tube_dc: DcBlocker::default(),
            shadow_l: OnePoleLowPass::new(sample_rate, HEAD_SHADOW_HZ),
            shadow_r: OnePoleLowPass::new(sample_rate, HEAD_SHADOW_HZ),
        }
    }

    fn reset(&mut self) {
        self.side_crossover.reset();
        self.air.reset();
        self.vocal_mid.reset();
        self.vocal_side.reset();
        self.tube_dc.reset();
        self.shadow_l.reset();
        self.shadow_r.reset();
    }
}

/// Stereo width/balance/clarity shaper
pub struct StereoShaper {
    params: Arc<StereoParams>,
    format: Option<StreamFormat>,
    filters: Option<ShaperFilters>,
}

impl Default for StereoShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl StereoShaper {
    /// Create an unconfigured shaper with neutral parameters
    pub fn new() -> Self {
        Self::with_params(Arc::new(StereoParams::default()))
    }

    /// Create a shaper reading from an existing parameter handle
    pub fn with_params(params: Arc<StereoParams>) -> Self {
        Self {
            params,
            format: None,
            filters: None,
        }
    }

    /// Shared parameter handle for the control thread
    pub fn params(&self) -> Arc<StereoParams> {
        Arc::clone(&self.params)
    }

    /// Set balance (-1.0 - 1.0)
    pub fn set_balance(&self, balance: f32) {
        self.params.set_balance(balance);
    }

    /// Get balance
    pub fn balance(&self) -> f32 {
        self.params.balance()
    }

    /// Set stereo width (0.0 - 2.0)
    pub fn set_stereo_width(&self, width: f32) {
        self.params.set_stereo_width(width);
    }

    /// Get stereo width
    pub fn stereo_width(&self) -> f32 {
        self.params.stereo_width()
    }

    /// Set clarity (0.0 - 1.0)
    pub fn set_clarity(&self, clarity: f32) {
        self.params.set_clarity(clarity);
    }

    /// Get clarity
    pub fn clarity(&self) -> f32 {
        self.params.clarity()
    }

    /// L/R to M/S encode
    #[inline]
    fn encode_ms(left: f32, right: f32) -> (f32, f32) {
        let mid = (left + right) * 0.5;
        let side = (left - right) * 0.5;
        (mid, side)
    }

    /// M/S to L/R decode
    #[inline]
    fn decode_ms(mid: f32, side: f32) -> (f32, f32) {
        (mid + side, mid - side)
    }

    /// Per-channel gains for a balance position
    #[inline]
    fn balance_gains(balance: f32) -> (f32, f32) {
        let left = if balance > 0.0 { 1.0 - balance } else { 1.0 };
        let right = if balance < 0.0 { 1.0 + balance } else { 1.0 };
        (left, right)
    }

    /// Clarity stage: detail, presence, air, warmth
    #[inline]
    fn enhance(f: &mut ShaperFilters, mid: f32, side: f32, clarity: f32) -> (f32, f32) {
        // Upward boost of quiet side content, loud content untouched
        let side_abs = side.abs().min(1.0);
        let quietness = 1.0 - side_abs;
        let mut side = side * (1.0 + clarity * DETAIL_GAIN * quietness * quietness);
        let mut mid = mid;

        // Vocal presence in the center
        let vocal_mid = f.vocal_mid.process(mid, &f.presence);
        mid += vocal_mid * clarity * VOCAL_MID_GAIN;

        // Vocal support in the sides, gently excited
        let vocal_side = f.vocal_side.process(side, &f.presence);
        side += (vocal_side * 2.0).tanh() * clarity * VOCAL_SIDE_GAIN;

        // Air: excited top octave of the side channel
        let air = f.air.process_highpass(side);
        side += (air * 4.0).tanh() * clarity * AIR_GAIN;

        // Tube warmth: DC-blocked even harmonic of the mid channel
        let even = f.tube_dc.process(mid * mid);
        mid += even * clarity * TUBE_WARMTH;

        (mid, side)
    }

    /// Process a stereo sample pair
    #[inline]
    fn process_frame(
        f: &mut ShaperFilters,
        left: f32,
        right: f32,
        balance: f32,
        width: f32,
        clarity: f32,
    ) -> (f32, f32) {
        let (mut mid, mut side) = Self::encode_ms(left, right);

        if clarity > 0.0 {
            (mid, side) = Self::enhance(f, mid, side, clarity);
        }

        // Width: bass stays mono-ish, highs widen; narrowing scales everything
        let side_low = f.side_crossover.process(side);
        let side_high = side - side_low;
        let side_processed = if width >= 1.0 {
            side_low + side_high * width * WIDEN_HIGH_GAIN
        } else {
            side * width
        };

        let (mut out_l, mut out_r) = Self::decode_ms(mid, side_processed);

        // Head shadow always tracks the input so engaging clarity is smooth
        let shadow_l = f.shadow_l.process(left);
        let shadow_r = f.shadow_r.process(right);
        if clarity > 0.0 {
            out_l += shadow_r * CROSSFEED_AMOUNT;
            out_r += shadow_l * CROSSFEED_AMOUNT;
        }

        let (gain_l, gain_r) = Self::balance_gains(balance);
        out_l *= gain_l;
        out_r *= gain_r;

        (soft_limit(out_l), soft_limit(out_r))
    }
}

impl Effect for StereoShaper {
    fn configure(&mut self, format: StreamFormat) -> Result<(), FormatError> {
        if let Err(err) = format.validate() {
            warn!(effect = self.name(), %err, "rejecting stream format, bypassing");
            self.release();
            return Err(err);
        }

        self.filters = Some(ShaperFilters::new(format.sample_rate_f32()));
        self.format = Some(format);
        debug!(effect = self.name(), sample_rate = format.sample_rate, "configured");
        Ok(())
    }

    fn is_active(&self) -> bool {
        self.format.is_some() && !self.params.is_neutral()
    }

    fn process(&mut self, samples: &mut [f32]) {
        if !self.is_active() {
            return;
        }
        let Some(filters) = self.filters.as_mut() else {
            return;
        };

        for frame in samples.chunks_exact_mut(2) {
            let balance = self.params.balance();
            let width = self.params.stereo_width();
            let clarity = self.params.clarity();

            let (out_l, out_r) =
                Self::process_frame(filters, frame[0], frame[1], balance, width, clarity);
            frame[0] = out_l;
            frame[1] = out_r;
        }
    }

    fn flush(&mut self) {
        if let Some(filters) = self.filters.as_mut() {
            filters.reset();
        }
    }

    fn release(&mut self) {
        self.format = None;
        self.filters = None;
    }

    fn format(&self) -> Option<StreamFormat> {
        self.format
    }

    fn name(&self) -> &'static str {
        "StereoShaper"
    }
}
