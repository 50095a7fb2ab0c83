//! Aural - offline renderer
//!
//! Runs raw interleaved little-endian `f32` stereo audio through the effects
//! chain, block by block, the same way an audio callback would.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use aural_control::{Config, ControlPlane, Preset};
use aural_dsp::{Effect, EffectsChain};

const USAGE: &str = "usage: aural <input.f32> <output.f32> [--sample-rate HZ] [--block FRAMES] \
[--preset NAME] [--defaults] [--balance X] [--width X] [--clarity X] [--bass X] [--reverb X] [--save]";

/// Command line options. Unset values fall back to the saved config.
#[derive(Debug, Default)]
struct Args {
    input: PathBuf,
    output: PathBuf,
    sample_rate: Option<u32>,
    block_frames: Option<usize>,
    preset: Option<Preset>,
    defaults: bool,
    balance: Option<f32>,
    width: Option<f32>,
    clarity: Option<f32>,
    bass: Option<f32>,
    reverb: Option<f32>,
    save: bool,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> anyhow::Result<Self> {
        let mut parsed = Args::default();
        let mut positional = Vec::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--sample-rate" => parsed.sample_rate = Some(value(&arg, args.next())?),
                "--block" => parsed.block_frames = Some(value(&arg, args.next())?),
                "--preset" => parsed.preset = Some(value(&arg, args.next())?),
                "--defaults" => parsed.defaults = true,
                "--balance" => parsed.balance = Some(value(&arg, args.next())?),
                "--width" => parsed.width = Some(value(&arg, args.next())?),
                "--clarity" => parsed.clarity = Some(value(&arg, args.next())?),
                "--bass" => parsed.bass = Some(value(&arg, args.next())?),
                "--reverb" => parsed.reverb = Some(value(&arg, args.next())?),
                "--save" => parsed.save = true,
                "-h" | "--help" => bail!(USAGE),
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                _ => positional.push(PathBuf::from(&arg)),
            }
        }

        let [input, output]: [PathBuf; 2] = positional
            .try_into()
            .map_err(|_| anyhow::anyhow!(USAGE))?;
        parsed.input = input;
        parsed.output = output;
        Ok(parsed)
    }

    /// Layer the command line on top of the saved config
    fn overlay(&self, mut config: Config) -> Config {
        if let Some(rate) = self.sample_rate {
            config.sample_rate = rate;
        }
        if let Some(frames) = self.block_frames {
            config.block_frames = frames.max(1);
        }
        config
    }

    /// Defaults first, then the preset, then individual values
    fn apply_params(&self, plane: &mut ControlPlane) {
        if self.defaults {
            plane.restore_defaults();
        }
        if let Some(preset) = self.preset {
            plane.apply_preset(preset);
        }
        if let Some(balance) = self.balance {
            plane.set_balance(balance);
        }
        if let Some(width) = self.width {
            plane.set_stereo_width(width);
        }
        if let Some(clarity) = self.clarity {
            plane.set_clarity(clarity);
        }
        if let Some(bass) = self.bass {
            plane.set_bass_strength(bass);
        }
        if let Some(reverb) = self.reverb {
            plane.set_reverb_amount(reverb);
        }
    }
}

fn value<T: std::str::FromStr>(flag: &str, raw: Option<String>) -> anyhow::Result<T> {
    let raw = raw.with_context(|| format!("{flag} needs a value"))?;
    raw.parse()
        .map_err(|_| anyhow::anyhow!("invalid value {raw:?} for {flag}"))
}

fn read_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

fn write_samples(samples: &[f32]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse(std::env::args().skip(1))?;
    let config = args.overlay(Config::load());

    let (handle, mut chain) = EffectsChain::channel();
    let mut plane = ControlPlane::new(handle, config);
    args.apply_params(&mut plane);

    let bytes = fs::read(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    if bytes.len() % 4 != 0 {
        warn!(extra = bytes.len() % 4, "input is not a whole number of f32 samples");
    }
    let mut samples = read_samples(&bytes);

    // Picked up by the chain at the start of the first block
    let format = plane.start_stream();
    let block = plane.config().block_frames * 2;
    for chunk in samples.chunks_mut(block) {
        chain.process(chunk);
    }
    if let Some(err) = chain.last_error() {
        bail!("stream format rejected: {err}");
    }

    fs::write(&args.output, write_samples(&samples))
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    info!(
        frames = samples.len() / 2,
        sample_rate = format.sample_rate,
        preset = %plane.preset(),
        params = ?plane.params(),
        "rendered {}",
        args.output.display()
    );

    if args.save {
        plane
            .persist()
            .with_context(|| format!("failed to save {}", Config::config_path().display()))?;
        info!("settings saved");
    }

    Ok(())
}
