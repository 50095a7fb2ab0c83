//! Second-order IIR section (direct form I)

use std::f64::consts::PI;

use super::sanitize;

/// Normalized biquad coefficients (a0 folded in)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f32,
    pub b1: f32,
    pub b2: f32,
    pub a1: f32,
    pub a2: f32,
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        Self::identity()
    }
}

impl BiquadCoeffs {
    /// Coefficients that pass the input through unchanged
    pub fn identity() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }

    /// RBJ band-pass with constant 0 dB peak gain
    pub fn band_pass(sample_rate: f32, center_hz: f32, q: f32) -> Self {
        let omega = 2.0 * PI * center_hz as f64 / sample_rate as f64;
        let alpha = omega.sin() / (2.0 * q as f64);
        let norm = 1.0 + alpha;

        Self {
            b0: (alpha / norm) as f32,
            b1: 0.0,
            b2: (-alpha / norm) as f32,
            a1: (-2.0 * omega.cos() / norm) as f32,
            a2: ((1.0 - alpha) / norm) as f32,
        }
    }
}

/// Two samples of input/output history for one channel
#[derive(Debug, Default, Clone)]
pub struct BiquadState {
    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl BiquadState {
    #[inline]
    pub fn process(&mut self, input: f32, c: &BiquadCoeffs) -> f32 {
        let output = sanitize(
            c.b0 * input + c.b1 * self.x1 + c.b2 * self.x2 - c.a1 * self.y1 - c.a2 * self.y2,
        );
        self.x2 = self.x1;
        self.x1 = sanitize(input);
        self.y2 = self.y1;
        self.y1 = output;
        output
    }

    pub fn reset(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }

    pub fn is_silent(&self) -> bool {
        self.x1 == 0.0 && self.x2 == 0.0 && self.y1 == 0.0 && self.y2 == 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine_peak(coeffs: &BiquadCoeffs, freq: f32, sample_rate: f32) -> f32 {
        let mut state = BiquadState::default();
        let mut peak = 0.0f32;
        for n in 0..(sample_rate as usize) {
            let x = (2.0 * std::f32::consts::PI * freq * n as f32 / sample_rate).sin();
            let y = state.process(x, coeffs);
            // Skip the start-up transient
            if n > sample_rate as usize / 2 {
                peak = peak.max(y.abs());
            }
        }
        peak
    }

    #[test]
    fn test_band_pass_coefficients() {
        let c = BiquadCoeffs::band_pass(44100.0, 3000.0, 0.5);
        assert_eq!(c.b1, 0.0);
        assert!((c.b0 + c.b2).abs() < 1e-7);
        assert!(c.b0 > 0.0);
    }

    #[test]
    fn test_band_pass_passes_center_rejects_extremes() {
        let sr = 44100.0;
        let c = BiquadCoeffs::band_pass(sr, 3000.0, 0.5);

        let center = sine_peak(&c, 3000.0, sr);
        let low = sine_peak(&c, 50.0, sr);
        let high = sine_peak(&c, 20000.0, sr);

        assert!((center - 1.0).abs() < 0.05, "center gain {}", center);
        assert!(low < 0.1, "low gain {}", low);
        assert!(high < center, "high gain {}", high);
    }

    #[test]
    fn test_identity_passthrough() {
        let c = BiquadCoeffs::identity();
        let mut state = BiquadState::default();
        for x in [0.1, -0.4, 0.9] {
            assert_eq!(state.process(x, &c), x);
        }
    }

    #[test]
    fn test_reset() {
        let c = BiquadCoeffs::band_pass(48000.0, 1000.0, 1.0);
        let mut state = BiquadState::default();
        state.process(0.7, &c);
        assert!(!state.is_silent());
        state.reset();
        assert!(state.is_silent());
    }
}
