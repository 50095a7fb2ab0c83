//! Stream format negotiation

use thiserror::Error;

/// Lowest sample rate the processors accept
pub const MIN_SAMPLE_RATE: u32 = 8_000;

/// Highest sample rate the processors accept. Delay lines scale with the rate.
pub const MAX_SAMPLE_RATE: u32 = 384_000;

/// Sample encoding of the incoming PCM stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleEncoding {
    /// 32-bit IEEE float, the only encoding the processors accept
    #[default]
    Float32,
    Pcm16,
    Pcm24,
    Pcm32,
}

/// Reasons a processor refuses a stream format
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("unsupported channel count {0} (stereo required)")]
    ChannelCount(u16),
    #[error("unsupported sample encoding {0:?} (float32 required)")]
    Encoding(SampleEncoding),
    #[error("unsupported sample rate {0} Hz (8000-384000 Hz supported)")]
    SampleRate(u32),
}

/// Format of the stream a processor is configured for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub encoding: SampleEncoding,
}

impl StreamFormat {
    /// Interleaved stereo float32 at the given rate
    pub fn stereo_f32(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 2,
            encoding: SampleEncoding::Float32,
        }
    }

    /// Check the format against what the processors can handle
    pub fn validate(&self) -> Result<(), FormatError> {
        if self.channels != 2 {
            return Err(FormatError::ChannelCount(self.channels));
        }
        if self.encoding != SampleEncoding::Float32 {
            return Err(FormatError::Encoding(self.encoding));
        }
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.sample_rate) {
            return Err(FormatError::SampleRate(self.sample_rate));
        }
        Ok(())
    }

    /// Sample rate as f32 for coefficient math
    #[inline]
    pub fn sample_rate_f32(&self) -> f32 {
        self.sample_rate as f32
    }
}
