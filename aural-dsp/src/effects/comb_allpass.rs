//! Freeverb-style comb/allpass network
//!
//! Parallel lowpass-feedback comb filters followed by series allpass
//! filters, one bank per channel. The right bank is detuned by a few samples
//! to decorrelate the channels.

use crate::filters::{sanitize, DelayLine};

/// Comb filter delay times in samples at 44.1kHz (from Freeverb)
const COMB_TUNINGS: [usize; 4] = [1116, 1188, 1277, 1356];

/// Allpass filter delay times in samples at 44.1kHz
const ALLPASS_TUNINGS: [usize; 2] = [225, 341];

/// Stereo spread in samples, added to every right-channel delay
const STEREO_SPREAD: usize = 23;

/// Allpass feedback (standard for diffusion)
const ALLPASS_FEEDBACK: f32 = 0.5;

/// Tuning reference rate
const REFERENCE_RATE: f32 = 44100.0;

/// Lowpass-feedback comb filter
struct CombFilter {
    line: DelayLine,
    filter_store: f32,
}

impl CombFilter {
    fn new(size: usize) -> Self {
        Self {
            line: DelayLine::new(size),
            filter_store: 0.0,
        }
    }

    #[inline]
    fn process(&mut self, input: f32, feedback: f32, damp: f32) -> f32 {
        let output = self.line.read();

        // Lowpass filter in feedback path (damping)
        self.filter_store = sanitize(output * (1.0 - damp) + self.filter_store * damp);

        self.line
            .write_and_advance(sanitize(input + self.filter_store * feedback));

        output
    }

    fn clear(&mut self) {
        self.line.clear();
        self.filter_store = 0.0;
    }

    fn is_silent(&self) -> bool {
        self.filter_store == 0.0 && self.line.is_silent()
    }
}

/// Schroeder allpass filter
struct AllpassFilter {
    line: DelayLine,
}

impl AllpassFilter {
    fn new(size: usize) -> Self {
        Self {
            line: DelayLine::new(size),
        }
    }

    #[inline]
    fn process(&mut self, input: f32) -> f32 {
        let buffered = self.line.read();
        let output = -input + buffered;
        self.line
            .write_and_advance(sanitize(input + buffered * ALLPASS_FEEDBACK));
        output
    }

    fn clear(&mut self) {
        self.line.clear();
    }

    fn is_silent(&self) -> bool {
        self.line.is_silent()
    }
}

/// Stereo comb/allpass reverberator core
pub struct CombAllpassNetwork {
    comb_l: [CombFilter; 4],
    allpass_l: [AllpassFilter; 2],
    comb_r: [CombFilter; 4],
    allpass_r: [AllpassFilter; 2],

    feedback: f32,
    damp: f32,
}

impl CombAllpassNetwork {
    /// Allocate all delay lines for `sample_rate`.
    ///
    /// `room_size` and `damping` are in 0.0-1.0 and fixed for the lifetime
    /// of the network.
    pub fn new(sample_rate: f32, room_size: f32, damping: f32) -> Self {
        let scale = sample_rate / REFERENCE_RATE;
        let scaled = |tuning: usize| ((tuning as f32 * scale).round() as usize).max(1);

        let comb_l = std::array::from_fn(|i| CombFilter::new(scaled(COMB_TUNINGS[i])));
        let allpass_l = std::array::from_fn(|i| AllpassFilter::new(scaled(ALLPASS_TUNINGS[i])));
        let comb_r = std::array::from_fn(|i| {
            CombFilter::new(scaled(COMB_TUNINGS[i]) + STEREO_SPREAD)
        });
        let allpass_r = std::array::from_fn(|i| {
            AllpassFilter::new(scaled(ALLPASS_TUNINGS[i]) + STEREO_SPREAD)
        });

        let room_size = room_size.clamp(0.0, 1.0);
        let damping = damping.clamp(0.0, 1.0);

        Self {
            comb_l,
            allpass_l,
            comb_r,
            allpass_r,
            feedback: room_size * 0.28 + 0.7,
            damp: damping * 0.4,
        }
    }

    /// Feed one mono sample, get the left/right reverberated pair
    #[inline]
    pub fn process(&mut self, input: f32) -> (f32, f32) {
        let mut out_l = 0.0;
        let mut out_r = 0.0;

        for comb in &mut self.comb_l {
            out_l += comb.process(input, self.feedback, self.damp);
        }
        for comb in &mut self.comb_r {
            out_r += comb.process(input, self.feedback, self.damp);
        }

        for allpass in &mut self.allpass_l {
            out_l = allpass.process(out_l);
        }
        for allpass in &mut self.allpass_r {
            out_r = allpass.process(out_r);
        }

        (out_l, out_r)
    }

    /// Zero every delay line without deallocating
    pub fn clear(&mut self) {
        for comb in self.comb_l.iter_mut().chain(self.comb_r.iter_mut()) {
            comb.clear();
        }
        for allpass in self.allpass_l.iter_mut().chain(self.allpass_r.iter_mut()) {
            allpass.clear();
        }
    }

    /// True when no energy remains anywhere in the network
    pub fn is_silent(&self) -> bool {
        self.comb_l.iter().chain(&self.comb_r).all(CombFilter::is_silent)
            && self
                .allpass_l
                .iter()
                .chain(&self.allpass_r)
                .all(AllpassFilter::is_silent)
    }

    /// Length in samples of the longest delay line
    pub fn longest_delay(&self) -> usize {
        self.comb_l
            .iter()
            .chain(&self.comb_r)
            .map(|c| c.line.len())
            .chain(self.allpass_l.iter().chain(&self.allpass_r).map(|a| a.line.len()))
            .max()
            .unwrap_or(0)
    }

    /// Comb delay lengths (left, right) in samples
    pub fn comb_lengths(&self) -> ([usize; 4], [usize; 4]) {
        (
            std::array::from_fn(|i| self.comb_l[i].line.len()),
            std::array::from_fn(|i| self.comb_r[i].line.len()),
        )
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    pub fn damp(&self) -> f32 {
        self.damp
    }
}
