//! Control plane - owns the settings and pushes them to the audio thread

use std::path::Path;

use aural_dsp::{ChainHandle, ProcessorParameters, StreamFormat};
use tracing::{debug, warn};

use crate::config::{Config, ConfigError};
use crate::preset::Preset;

/// Settings owner for one running [`aural_dsp::EffectsChain`]
///
/// Every setter stores the clamped value in the chain's shared parameters
/// and records it in the config, so the two never drift apart. Changing a
/// single parameter by hand turns the preset into [`Preset::Custom`].
pub struct ControlPlane {
    handle: ChainHandle,
    config: Config,
}

impl ControlPlane {
    /// Wrap a chain handle and push the config's parameters into it
    pub fn new(handle: ChainHandle, config: Config) -> Self {
        let mut plane = Self { handle, config };
        plane.sync();
        plane
    }

    /// Push a full parameter snapshot
    pub fn apply(&mut self, params: ProcessorParameters) {
        self.config.params = params.clamped();
        self.sync();
    }

    pub fn set_balance(&mut self, balance: f32) -> f32 {
        let value = self.handle.set_balance(balance);
        self.config.params.balance = value;
        self.config.preset = Preset::Custom;
        value
    }

    pub fn set_stereo_width(&mut self, width: f32) -> f32 {
        let value = self.handle.set_stereo_width(width);
        self.config.params.stereo_width = value;
        self.config.preset = Preset::Custom;
        value
    }

    pub fn set_clarity(&mut self, clarity: f32) -> f32 {
        let value = self.handle.set_clarity(clarity);
        self.config.params.clarity = value;
        self.config.preset = Preset::Custom;
        value
    }

    pub fn set_bass_strength(&mut self, strength: f32) -> f32 {
        let value = self.handle.set_bass_strength(strength);
        self.config.params.bass_strength = value;
        self.config.preset = Preset::Custom;
        value
    }

    pub fn set_reverb_amount(&mut self, amount: f32) -> f32 {
        let value = self.handle.set_reverb_amount(amount);
        self.config.params.reverb_amount = value;
        self.config.preset = Preset::Custom;
        value
    }

    /// Switch to a named preset. `Custom` keeps the current values.
    pub fn apply_preset(&mut self, preset: Preset) {
        self.config.params = preset.apply(self.config.params);
        self.config.preset = preset;
        self.sync();
        debug!(%preset, "preset applied");
    }

    /// Put every parameter back to its neutral default
    pub fn restore_defaults(&mut self) {
        self.config.params = ProcessorParameters::default();
        self.config.preset = Preset::Custom;
        self.sync();
    }

    pub fn preset(&self) -> Preset {
        self.config.preset
    }

    /// Queue a configure for the stream format described by the config
    pub fn start_stream(&self) -> StreamFormat {
        let format = StreamFormat::stereo_f32(self.config.sample_rate);
        if !self.handle.configure(format) {
            warn!(sample_rate = format.sample_rate, "could not queue configure");
        }
        format
    }

    pub fn flush(&self) -> bool {
        self.handle.flush()
    }

    pub fn release(&self) -> bool {
        self.handle.release()
    }

    pub fn params(&self) -> ProcessorParameters {
        self.config.params
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn handle(&self) -> &ChainHandle {
        &self.handle
    }

    /// Save the current settings to the default config location
    pub fn persist(&self) -> Result<(), ConfigError> {
        self.config.save()
    }

    /// Save the current settings to a specific path
    pub fn persist_to(&self, path: &Path) -> Result<(), ConfigError> {
        self.config.save_to(path)
    }

    fn sync(&mut self) {
        self.handle.apply(&self.config.params);
        // The handle clamps and maps NaN to defaults; keep what it stored.
        self.config.params = self.handle.snapshot();
        debug!(params = ?self.config.params, "parameters pushed to chain");
    }
}
