//! Effects chain - wires the processors together and talks to the control thread
//!
//! Signal flow:
//! ```text
//! Input → StereoShaper → BassEnhancer → ReverbEngine → Output
//! ```
//!
//! The audio thread owns the [`EffectsChain`]. The control thread holds a
//! [`ChainHandle`]: parameters go straight into shared atomics, while
//! lifecycle commands (configure, flush, reset, release) are queued and
//! applied before the next buffer.

use std::sync::Arc;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use tracing::{debug, warn};

use crate::effects::{BassEnhancer, Effect, ReverbEngine, StereoShaper};
use crate::format::{FormatError, StreamFormat};
use crate::params::{BassParams, ProcessorParameters, ReverbParams, StereoParams};

/// Command queue depth; lifecycle commands are rare
const COMMAND_CAPACITY: usize = 64;

/// Lifecycle commands applied between buffers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainCommand {
    Configure(StreamFormat),
    Flush,
    Reset,
    Release,
}

/// Stereo → Bass → Reverb processing chain
pub struct EffectsChain {
    stereo: StereoShaper,
    bass: BassEnhancer,
    reverb: ReverbEngine,
    commands: Option<Receiver<ChainCommand>>,
    last_error: Option<FormatError>,
}

impl Default for EffectsChain {
    fn default() -> Self {
        Self::new()
    }
}

impl EffectsChain {
    /// Create a chain driven directly, without a command queue
    pub fn new() -> Self {
        Self {
            stereo: StereoShaper::new(),
            bass: BassEnhancer::new(),
            reverb: ReverbEngine::new(),
            commands: None,
            last_error: None,
        }
    }

    /// Create a chain and the handle used to control it from another thread
    pub fn channel() -> (ChainHandle, EffectsChain) {
        let (command_tx, command_rx) = bounded(COMMAND_CAPACITY);
        let mut chain = Self::new();
        chain.commands = Some(command_rx);

        let handle = ChainHandle {
            command_tx,
            stereo: chain.stereo.params(),
            bass: chain.bass.params(),
            reverb: chain.reverb.params(),
        };
        (handle, chain)
    }

    /// Apply every queued command. Called at the start of each buffer.
    pub fn drain_commands(&mut self) {
        let Some(commands) = self.commands.take() else {
            return;
        };
        while let Ok(command) = commands.try_recv() {
            self.handle_command(command);
        }
        self.commands = Some(commands);
    }

    /// Apply a single lifecycle command
    pub fn handle_command(&mut self, command: ChainCommand) {
        match command {
            ChainCommand::Configure(format) => {
                // Errors are recorded and each stage bypasses itself
                let _ = self.configure(format);
            }
            ChainCommand::Flush => self.flush(),
            ChainCommand::Reset => self.reset(),
            ChainCommand::Release => self.release(),
        }
    }

    /// Push a full parameter snapshot into the live parameters
    pub fn apply(&self, params: &ProcessorParameters) {
        apply_to(&self.stereo.params(), &self.bass.params(), &self.reverb.params(), params);
    }

    /// Error from the most recent configure, if it failed
    pub fn last_error(&self) -> Option<&FormatError> {
        self.last_error.as_ref()
    }

    /// Access the stereo shaper for direct parameter control
    pub fn stereo(&self) -> &StereoShaper {
        &self.stereo
    }

    /// Access the bass enhancer for direct parameter control
    pub fn bass(&self) -> &BassEnhancer {
        &self.bass
    }

    /// Access the reverb for direct parameter control
    pub fn reverb(&self) -> &ReverbEngine {
        &self.reverb
    }
}

impl Effect for EffectsChain {
    fn configure(&mut self, format: StreamFormat) -> Result<(), FormatError> {
        // Every stage validates on its own; they agree on the outcome
        let result = self
            .stereo
            .configure(format)
            .and(self.bass.configure(format))
            .and(self.reverb.configure(format));

        match &result {
            Ok(()) => {
                debug!(sample_rate = format.sample_rate, "effects chain configured");
                self.last_error = None;
            }
            Err(err) => {
                warn!(%err, "effects chain bypassed");
                self.last_error = Some(err.clone());
            }
        }
        result
    }

    fn is_active(&self) -> bool {
        self.stereo.is_active() || self.bass.is_active() || self.reverb.is_active()
    }

    fn process(&mut self, samples: &mut [f32]) {
        self.drain_commands();
        if samples.is_empty() {
            return;
        }

        // Signal flow: Stereo → Bass → Reverb
        self.stereo.process(samples);
        self.bass.process(samples);
        self.reverb.process(samples);
    }

    fn flush(&mut self) {
        self.stereo.flush();
        self.bass.flush();
        self.reverb.flush();
    }

    fn reset(&mut self) {
        self.stereo.reset();
        self.bass.reset();
        self.reverb.reset();
    }

    fn release(&mut self) {
        self.stereo.release();
        self.bass.release();
        self.reverb.release();
    }

    fn format(&self) -> Option<StreamFormat> {
        self.stereo.format()
    }

    fn name(&self) -> &'static str {
        "EffectsChain"
    }
}

/// Control-thread side of an [`EffectsChain`]
#[derive(Clone)]
pub struct ChainHandle {
    command_tx: Sender<ChainCommand>,
    stereo: Arc<StereoParams>,
    bass: Arc<BassParams>,
    reverb: Arc<ReverbParams>,
}

impl ChainHandle {
    /// Queue a lifecycle command. Returns false if the queue is full or the
    /// chain is gone.
    pub fn send(&self, command: ChainCommand) -> bool {
        match self.command_tx.try_send(command) {
            Ok(()) => true,
            Err(TrySendError::Full(command)) => {
                warn!(?command, "chain command queue full, dropping command");
                false
            }
            Err(TrySendError::Disconnected(command)) => {
                debug!(?command, "chain dropped, command ignored");
                false
            }
        }
    }

    /// Queue a reconfiguration for the next buffer boundary
    pub fn configure(&self, format: StreamFormat) -> bool {
        self.send(ChainCommand::Configure(format))
    }

    pub fn flush(&self) -> bool {
        self.send(ChainCommand::Flush)
    }

    pub fn reset(&self) -> bool {
        self.send(ChainCommand::Reset)
    }

    pub fn release(&self) -> bool {
        self.send(ChainCommand::Release)
    }

    /// Push a full parameter snapshot
    pub fn apply(&self, params: &ProcessorParameters) {
        apply_to(&self.stereo, &self.bass, &self.reverb, params);
    }

    /// Read the live parameters back as a snapshot
    pub fn snapshot(&self) -> ProcessorParameters {
        ProcessorParameters {
            balance: self.stereo.balance(),
            stereo_width: self.stereo.stereo_width(),
            clarity: self.stereo.clarity(),
            bass_strength: self.bass.strength(),
            reverb_amount: self.reverb.amount(),
        }
    }

    pub fn set_balance(&self, balance: f32) -> f32 {
        self.stereo.set_balance(balance)
    }

    pub fn set_stereo_width(&self, width: f32) -> f32 {
        self.stereo.set_stereo_width(width)
    }

    pub fn set_clarity(&self, clarity: f32) -> f32 {
        self.stereo.set_clarity(clarity)
    }

    pub fn set_bass_strength(&self, strength: f32) -> f32 {
        self.bass.set_strength(strength)
    }

    pub fn set_reverb_amount(&self, amount: f32) -> f32 {
        self.reverb.set_amount(amount)
    }
}

fn apply_to(
    stereo: &StereoParams,
    bass: &BassParams,
    reverb: &ReverbParams,
    params: &ProcessorParameters,
) {
    stereo.set_balance(params.balance);
    stereo.set_stereo_width(params.stereo_width);
    stereo.set_clarity(params.clarity);
    bass.set_strength(params.bass_strength);
    reverb.set_amount(params.reverb_amount);
}
