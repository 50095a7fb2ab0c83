//! DC blocker for the output of square-law nonlinearities

use super::sanitize;

/// First-order DC blocker: `y = x - x_prev + pole * y_prev`
#[derive(Debug, Clone)]
pub struct DcBlocker {
    pole: f32,
    x_prev: f32,
    y_prev: f32,
}

impl Default for DcBlocker {
    fn default() -> Self {
        Self::new(Self::DEFAULT_POLE)
    }
}

impl DcBlocker {
    /// Leaky-integrator pole used after harmonic generators
    pub const DEFAULT_POLE: f32 = 0.995;

    pub fn new(pole: f32) -> Self {
        Self {
            pole,
            x_prev: 0.0,
            y_prev: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = sanitize(input - self.x_prev + self.pole * self.y_prev);
        self.x_prev = sanitize(input);
        self.y_prev = output;
        output
    }

    pub fn reset(&mut self) {
        self.x_prev = 0.0;
        self.y_prev = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_constant_offset() {
        let mut dc = DcBlocker::default();
        let mut out = 1.0;
        for _ in 0..10_000 {
            out = dc.process(0.25);
        }
        assert!(out.abs() < 1e-6, "residual offset {}", out);
    }

    #[test]
    fn test_squared_sine_is_centered() {
        let mut dc = DcBlocker::default();
        let mut sum = 0.0;
        let n = 44100;
        for i in 0..n {
            let x = (2.0 * std::f32::consts::PI * 60.0 * i as f32 / 44100.0).sin();
            let y = dc.process(x * x);
            if i >= n / 2 {
                sum += y;
            }
        }
        let mean = sum / (n / 2) as f32;
        assert!(mean.abs() < 0.01, "mean {}", mean);
    }

    #[test]
    fn test_silence_stays_silent() {
        let mut dc = DcBlocker::default();
        for _ in 0..100 {
            assert_eq!(dc.process(0.0), 0.0);
        }
    }
}
