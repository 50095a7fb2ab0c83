//! Control plane for Aural - persisted settings and the parameter pusher

mod config;
mod control;
mod preset;

pub use config::{Config, ConfigError};
pub use control::ControlPlane;
pub use preset::{Preset, UnknownPreset};
