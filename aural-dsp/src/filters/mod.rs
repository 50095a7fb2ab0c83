//! Filter primitives shared by every processor
//!
//! Coefficients are computed once per stream format. `process` is O(1) and
//! allocation free.

mod biquad;
mod dc_blocker;
mod delay_line;
mod one_pole;

pub use biquad::{BiquadCoeffs, BiquadState};
pub use dc_blocker::DcBlocker;
pub use delay_line::DelayLine;
pub use one_pole::{OnePoleHighPass, OnePoleLowPass};

/// Largest magnitude any filter state may hold
pub const STATE_LIMIT: f32 = 64.0;

/// Replace a non-finite state value with silence and bound its magnitude
#[inline]
pub fn sanitize(x: f32) -> f32 {
    if x.is_finite() {
        x.clamp(-STATE_LIMIT, STATE_LIMIT)
    } else {
        0.0
    }
}

/// tanh soft limiter that maps NaN to silence
#[inline]
pub fn soft_limit(x: f32) -> f32 {
    if x.is_nan() {
        0.0
    } else {
        x.tanh()
    }
}

/// Smoothing coefficient of a one-pole low-pass: `dt / (rc + dt)`
#[inline]
pub(crate) fn lowpass_alpha(sample_rate: f32, cutoff_hz: f32) -> f32 {
    let dt = 1.0 / sample_rate as f64;
    let rc = 1.0 / (2.0 * std::f64::consts::PI * cutoff_hz as f64);
    (dt / (rc + dt)) as f32
}

/// Pole of the complementary one-pole high-pass: `rc / (rc + dt)`
#[inline]
pub(crate) fn highpass_alpha(sample_rate: f32, cutoff_hz: f32) -> f32 {
    let dt = 1.0 / sample_rate as f64;
    let rc = 1.0 / (2.0 * std::f64::consts::PI * cutoff_hz as f64);
    (rc / (rc + dt)) as f32
}
