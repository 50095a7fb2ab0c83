//! One-pole RC filters

use super::{highpass_alpha, lowpass_alpha, sanitize};

/// One-pole low-pass: `y = y_prev + alpha * (x - y_prev)`
#[derive(Debug, Clone, Default)]
pub struct OnePoleLowPass {
    alpha: f32,
    state: f32,
}

impl OnePoleLowPass {
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        Self {
            alpha: lowpass_alpha(sample_rate, cutoff_hz),
            state: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        self.state = sanitize(self.state + self.alpha * (input - self.state));
        self.state
    }

    /// Complementary high band: `x - lowpass(x)`
    #[inline]
    pub fn process_highpass(&mut self, input: f32) -> f32 {
        input - self.process(input)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn state(&self) -> f32 {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = 0.0;
    }
}

/// One-pole high-pass in complementary form: `y = a * (y_prev + x - x_prev)`
#[derive(Debug, Clone, Default)]
pub struct OnePoleHighPass {
    pole: f32,
    x_prev: f32,
    y_prev: f32,
}

impl OnePoleHighPass {
    pub fn new(sample_rate: f32, cutoff_hz: f32) -> Self {
        Self {
            pole: highpass_alpha(sample_rate, cutoff_hz),
            x_prev: 0.0,
            y_prev: 0.0,
        }
    }

    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = sanitize(self.pole * (self.y_prev + input - self.x_prev));
        self.x_prev = sanitize(input);
        self.y_prev = output;
        output
    }

    pub fn pole(&self) -> f32 {
        self.pole
    }

    pub fn reset(&mut self) {
        self.x_prev = 0.0;
        self.y_prev = 0.0;
    }
}
