//! Named sound presets

use std::fmt;
use std::str::FromStr;

use aural_dsp::ProcessorParameters;
use thiserror::Error;

/// Preset name that isn't one of [`Preset::ALL`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown preset {0:?}")]
pub struct UnknownPreset(pub String);

/// Named starting points for width, clarity, bass and reverb
///
/// A preset leaves balance alone, since that depends on the listener's
/// setup rather than the sound. `Custom` changes nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preset {
    /// Balanced, warm and clear
    Signature,
    /// Heavy bass
    BassHead,
    /// Mid/side emphasis with lifted highs
    VocalAir,
    /// Wide and ambient
    LiveStadium,
    /// Thick and narrower
    VinylWarmth,
    /// Whatever the individual settings say
    #[default]
    Custom,
}

impl Preset {
    pub const ALL: [Preset; 6] = [
        Preset::Signature,
        Preset::BassHead,
        Preset::VocalAir,
        Preset::LiveStadium,
        Preset::VinylWarmth,
        Preset::Custom,
    ];

    /// Name used in the config file and on the command line
    pub fn name(self) -> &'static str {
        match self {
            Preset::Signature => "signature",
            Preset::BassHead => "bass_head",
            Preset::VocalAir => "vocal_air",
            Preset::LiveStadium => "live_stadium",
            Preset::VinylWarmth => "vinyl_warmth",
            Preset::Custom => "custom",
        }
    }

    /// (stereo_width, clarity, bass_strength, reverb_amount)
    fn values(self) -> Option<(f32, f32, f32, f32)> {
        match self {
            Preset::Signature => Some((1.0, 0.3, 0.4, 0.1)),
            Preset::BassHead => Some((1.0, 0.2, 0.85, 0.0)),
            Preset::VocalAir => Some((1.2, 0.8, 0.2, 0.2)),
            Preset::LiveStadium => Some((1.4, 0.4, 0.5, 0.6)),
            Preset::VinylWarmth => Some((0.9, 0.1, 0.6, 0.3)),
            Preset::Custom => None,
        }
    }

    /// Parameters after applying this preset on top of `current`
    pub fn apply(self, current: ProcessorParameters) -> ProcessorParameters {
        match self.values() {
            Some((stereo_width, clarity, bass_strength, reverb_amount)) => ProcessorParameters {
                balance: current.balance,
                stereo_width,
                clarity,
                bass_strength,
                reverb_amount,
            },
            None => current,
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = UnknownPreset;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| UnknownPreset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for preset in Preset::ALL {
            assert_eq!(preset.name().parse::<Preset>(), Ok(preset));
        }
        assert_eq!(
            "loudness_war".parse::<Preset>(),
            Err(UnknownPreset("loudness_war".to_string()))
        );
    }

    #[test]
    fn test_preset_values() {
        let params = Preset::LiveStadium.apply(ProcessorParameters::default());
        assert_eq!(params.stereo_width, 1.4);
        assert_eq!(params.clarity, 0.4);
        assert_eq!(params.bass_strength, 0.5);
        assert_eq!(params.reverb_amount, 0.6);

        let params = Preset::BassHead.apply(ProcessorParameters::default());
        assert_eq!(params.bass_strength, 0.85);
        assert_eq!(params.reverb_amount, 0.0);
    }

    #[test]
    fn test_preset_keeps_balance() {
        let current = ProcessorParameters {
            balance: -0.3,
            ..ProcessorParameters::default()
        };
        assert_eq!(Preset::VinylWarmth.apply(current).balance, -0.3);
    }

    #[test]
    fn test_custom_changes_nothing() {
        let current = ProcessorParameters {
            balance: 0.1,
            stereo_width: 1.7,
            clarity: 0.9,
            bass_strength: 0.05,
            reverb_amount: 0.45,
        };
        assert_eq!(Preset::Custom.apply(current), current);
    }

    #[test]
    fn test_every_preset_is_in_range() {
        for preset in Preset::ALL {
            let params = preset.apply(ProcessorParameters::default());
            assert_eq!(params.clamped(), params, "{preset} out of range");
        }
    }
}
