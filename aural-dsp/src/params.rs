//! Lock-free processor parameters
//!
//! Every parameter is an `f32` stored as bits in an `AtomicU32`. The control
//! thread writes with `set`, the audio thread reads with `get` once per frame.
//! A read always observes a whole value, and neither side ever waits.

use std::sync::atomic::{AtomicU32, Ordering};

/// Single clamped `f32` parameter shared between threads
#[derive(Debug)]
pub struct AtomicParam {
    bits: AtomicU32,
    default: f32,
    min: f32,
    max: f32,
}

impl AtomicParam {
    /// Create a parameter with its default value and valid range
    pub fn new(default: f32, min: f32, max: f32) -> Self {
        Self {
            bits: AtomicU32::new(default.clamp(min, max).to_bits()),
            default,
            min,
            max,
        }
    }

    /// Store a value, clamped to the valid range. NaN restores the default.
    ///
    /// Returns the value actually stored.
    pub fn set(&self, value: f32) -> f32 {
        let value = if value.is_nan() {
            self.default
        } else {
            value.clamp(self.min, self.max)
        };
        self.bits.store(value.to_bits(), Ordering::Relaxed);
        value
    }

    /// Load the last stored value
    #[inline]
    pub fn get(&self) -> f32 {
        f32::from_bits(self.bits.load(Ordering::Relaxed))
    }

    pub fn default_value(&self) -> f32 {
        self.default
    }

    pub fn range(&self) -> (f32, f32) {
        (self.min, self.max)
    }
}

/// Live parameters of the stereo shaper
#[derive(Debug)]
pub struct StereoParams {
    balance: AtomicParam,
    stereo_width: AtomicParam,
    clarity: AtomicParam,
}

impl Default for StereoParams {
    fn default() -> Self {
        Self {
            balance: AtomicParam::new(0.0, -1.0, 1.0),
            stereo_width: AtomicParam::new(1.0, 0.0, 2.0),
            clarity: AtomicParam::new(0.0, 0.0, 1.0),
        }
    }
}

impl StereoParams {
    /// Set balance (-1.0 full left .. 1.0 full right)
    pub fn set_balance(&self, balance: f32) -> f32 {
        self.balance.set(balance)
    }

    pub fn balance(&self) -> f32 {
        self.balance.get()
    }

    /// Set stereo width (0.0 mono .. 1.0 unchanged .. 2.0 wide)
    pub fn set_stereo_width(&self, width: f32) -> f32 {
        self.stereo_width.set(width)
    }

    pub fn stereo_width(&self) -> f32 {
        self.stereo_width.get()
    }

    /// Set clarity (0.0 off .. 1.0 maximum)
    pub fn set_clarity(&self, clarity: f32) -> f32 {
        self.clarity.set(clarity)
    }

    pub fn clarity(&self) -> f32 {
        self.clarity.get()
    }

    /// True when every parameter sits at its neutral value
    pub fn is_neutral(&self) -> bool {
        self.clarity() == 0.0 && self.stereo_width() == 1.0 && self.balance() == 0.0
    }
}

/// Live parameters of the bass enhancer
#[derive(Debug)]
pub struct BassParams {
    strength: AtomicParam,
}

impl Default for BassParams {
    fn default() -> Self {
        Self {
            strength: AtomicParam::new(0.0, 0.0, 1.0),
        }
    }
}

impl BassParams {
    /// Set strength (0.0 off .. 1.0 maximum)
    pub fn set_strength(&self, strength: f32) -> f32 {
        self.strength.set(strength)
    }

    pub fn strength(&self) -> f32 {
        self.strength.get()
    }
}

/// Live parameters of the reverb engine
#[derive(Debug)]
pub struct ReverbParams {
    amount: AtomicParam,
}

impl Default for ReverbParams {
    fn default() -> Self {
        Self {
            amount: AtomicParam::new(0.0, 0.0, 1.0),
        }
    }
}

impl ReverbParams {
    /// Set amount (0.0 dry .. 1.0 maximum wet)
    pub fn set_amount(&self, amount: f32) -> f32 {
        self.amount.set(amount)
    }

    pub fn amount(&self) -> f32 {
        self.amount.get()
    }
}

/// Plain snapshot of every chain parameter, owned by the control plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessorParameters {
    pub balance: f32,
    pub stereo_width: f32,
    pub clarity: f32,
    pub bass_strength: f32,
    pub reverb_amount: f32,
}

impl Default for ProcessorParameters {
    fn default() -> Self {
        Self {
            balance: 0.0,
            stereo_width: 1.0,
            clarity: 0.0,
            bass_strength: 0.0,
            reverb_amount: 0.0,
        }
    }
}

impl ProcessorParameters {
    /// Copy with every field clamped to its valid range. NaN becomes the
    /// field's default, as with [`AtomicParam::set`].
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            balance: clamp_or(self.balance, -1.0, 1.0, defaults.balance),
            stereo_width: clamp_or(self.stereo_width, 0.0, 2.0, defaults.stereo_width),
            clarity: clamp_or(self.clarity, 0.0, 1.0, defaults.clarity),
            bass_strength: clamp_or(self.bass_strength, 0.0, 1.0, defaults.bass_strength),
            reverb_amount: clamp_or(self.reverb_amount, 0.0, 1.0, defaults.reverb_amount),
        }
    }
}

#[inline]
fn clamp_or(value: f32, min: f32, max: f32, default: f32) -> f32 {
    if value.is_nan() {
        default
    } else {
        value.clamp(min, max)
    }
}
