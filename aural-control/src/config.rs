//! Simple configuration persistence for Aural
//!
//! Stores the effect parameters and the preferred stream settings.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use aural_dsp::{ProcessorParameters, StreamFormat};
use thiserror::Error;
use tracing::{debug, warn};

use crate::preset::Preset;

/// Errors that can occur while loading or saving the config
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("invalid value {value:?} for key {key:?}")]
    InvalidValue { key: String, value: String },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Effect parameters, always within their valid ranges
    pub params: ProcessorParameters,
    /// Preset the parameters started from
    pub preset: Preset,
    /// Preferred stream sample rate in Hz
    pub sample_rate: u32,
    /// Frames per processing block
    pub block_frames: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            params: ProcessorParameters::default(),
            preset: Preset::Custom,
            sample_rate: 44100,
            block_frames: 512,
        }
    }
}

impl Config {
    /// Load config from the default location
    ///
    /// Returns default config if file doesn't exist or can't be parsed.
    pub fn load() -> Self {
        let path = Self::config_path();
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                Self::default()
            }
            Err(err) => {
                warn!(path = %path.display(), %err, "unreadable config, using defaults");
                Self::default()
            }
        }
    }

    /// Load config from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::config_path();
        self.save_to(&path)
    }

    /// Save config to a specific path
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, self.serialize())?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }

    /// Get the default config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aural")
            .join("effects.conf")
    }

    /// Parse config from simple key=value format
    ///
    /// A `preset` line sets the starting parameters wherever it appears.
    /// Explicit parameter lines override it.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut entries = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match line.split_once('=') {
                Some((key, value)) => entries.push((key.trim(), value.trim())),
                None => debug!(line, "ignoring line without '='"),
            }
        }

        let mut config = Self::default();
        for &(key, value) in entries.iter().filter(|(key, _)| *key == "preset") {
            config.preset = value.parse().map_err(|_| invalid(key, value))?;
        }
        config.params = config.preset.apply(config.params);

        for (key, value) in entries {
            match key {
                "preset" => {}
                "balance" => config.params.balance = parse_value(key, value)?,
                "stereo_width" => config.params.stereo_width = parse_value(key, value)?,
                "clarity" => config.params.clarity = parse_value(key, value)?,
                "bass_strength" => config.params.bass_strength = parse_value(key, value)?,
                "reverb_amount" => config.params.reverb_amount = parse_value(key, value)?,
                "sample_rate" => config.sample_rate = parse_value(key, value)?,
                "block_frames" => config.block_frames = parse_value(key, value)?,
                _ => debug!(key, "ignoring unknown config key"),
            }
        }

        config.params = config.params.clamped();
        if StreamFormat::stereo_f32(config.sample_rate).validate().is_err() {
            return Err(invalid("sample_rate", &config.sample_rate.to_string()));
        }
        if config.block_frames == 0 {
            return Err(invalid("block_frames", "0"));
        }
        Ok(config)
    }

    /// Serialize config to simple key=value format
    pub fn serialize(&self) -> String {
        let p = &self.params;
        let lines = [
            "# Aural effects configuration".to_string(),
            format!("preset={}", self.preset),
            format!("balance={}", p.balance),
            format!("stereo_width={}", p.stereo_width),
            format!("clarity={}", p.clarity),
            format!("bass_strength={}", p.bass_strength),
            format!("reverb_amount={}", p.reverb_amount),
            format!("sample_rate={}", self.sample_rate),
            format!("block_frames={}", self.block_frames),
        ];
        lines.join("\n")
    }
}

fn invalid(key: &str, value: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| invalid(key, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_empty() {
        let config = Config::parse("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_parse_values() {
        let content = "clarity=0.5\nbass_strength=0.25\nsample_rate=48000";
        let config = Config::parse(content).unwrap();
        assert_eq!(config.params.clarity, 0.5);
        assert_eq!(config.params.bass_strength, 0.25);
        assert_eq!(config.sample_rate, 48000);
        assert_eq!(config.params.stereo_width, 1.0);
    }

    #[test]
    fn test_parse_with_comments_and_unknown_keys() {
        let content = "# Comment\nreverb_amount = 0.3\ntheme=dark\n# Another comment";
        let config = Config::parse(content).unwrap();
        assert_eq!(config.params.reverb_amount, 0.3);
    }

    #[test]
    fn test_values_are_clamped() {
        let config = Config::parse("stereo_width=5\nbalance=-3\nclarity=-1").unwrap();
        assert_eq!(config.params.stereo_width, 2.0);
        assert_eq!(config.params.balance, -1.0);
        assert_eq!(config.params.clarity, 0.0);
    }

    #[test]
    fn test_invalid_number_is_rejected() {
        let err = Config::parse("bass_strength=loud").unwrap_err();
        match err {
            ConfigError::InvalidValue { key, value } => {
                assert_eq!(key, "bass_strength");
                assert_eq!(value, "loud");
            }
            other => panic!("unexpected error {other}"),
        }
        assert!(Config::parse("block_frames=0").is_err());
    }

    #[test]
    fn test_nan_values_fall_back_to_defaults() {
        let config = Config::parse("clarity=NaN\nstereo_width=nan\nbass_strength=0.3").unwrap();
        assert_eq!(config.params.clarity, 0.0);
        assert_eq!(config.params.stereo_width, 1.0);
        assert_eq!(config.params.bass_strength, 0.3);
        assert!(!config.serialize().contains("NaN"));
    }

    #[test]
    fn test_unsupported_sample_rate_is_rejected() {
        let err = Config::parse("sample_rate=4000000000").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "sample_rate"
        ));
        assert!(Config::parse("sample_rate=0").is_err());
        assert!(Config::parse("sample_rate=192000").is_ok());
    }

    #[test]
    fn test_preset_sets_starting_values() {
        let config = Config::parse("preset=vocal_air").unwrap();
        assert_eq!(config.preset, Preset::VocalAir);
        assert_eq!(config.params.stereo_width, 1.2);
        assert_eq!(config.params.clarity, 0.8);
        assert_eq!(config.params.bass_strength, 0.2);
        assert_eq!(config.params.reverb_amount, 0.2);
    }

    #[test]
    fn test_explicit_values_override_preset_in_any_order() {
        let config = Config::parse("bass_strength=0.1\npreset=bass_head\nbalance=0.5").unwrap();
        assert_eq!(config.preset, Preset::BassHead);
        assert_eq!(config.params.bass_strength, 0.1);
        assert_eq!(config.params.clarity, 0.2);
        assert_eq!(config.params.balance, 0.5);
    }

    #[test]
    fn test_unknown_preset_is_rejected() {
        let err = Config::parse("preset=loudness_war").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref key, .. } if key == "preset"
        ));
    }

    #[test]
    fn test_serialize_roundtrip() {
        let mut config = Config::default();
        config.params.clarity = 0.75;
        config.params.balance = -0.2;
        config.preset = Preset::LiveStadium;
        config.block_frames = 256;

        let parsed = Config::parse(&config.serialize()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("effects.conf");

        let mut config = Config::default();
        config.params.reverb_amount = 0.4;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(&dir.path().join("absent.conf")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
