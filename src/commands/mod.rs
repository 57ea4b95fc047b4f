//! Command module - Strategy pattern for CLI commands.
//!
//! Each command is a separate module implementing the `CommandExecutor` trait.
//! This provides clean separation of concerns and makes adding new commands easy.

mod capacity;
mod config;
mod embed;
mod extract;

pub use capacity::CapacityCommand;
pub use config::ConfigCommand;
pub use embed::EmbedCommand;
pub use extract::ExtractCommand;

use anyhow::Result;

use bithide::config::Settings;
use bithide::{Carrier, SampleCarrier, Shape};

/// Trait for command execution - Strategy pattern.
///
/// Each command struct holds its parsed arguments and implements
/// this trait to define its execution logic.
pub trait CommandExecutor {
    /// Executes the command with its parsed arguments and the stored settings.
    fn execute(&self, settings: &Settings) -> Result<()>;
}

/// One-line human description of a loaded carrier.
fn describe(carrier: &Carrier) -> String {
    match carrier.shape() {
        Shape::Image {
            width,
            height,
            channels,
        } => format!(
            "image {}x{}, {} channel(s), {} samples",
            width,
            height,
            channels,
            carrier.flat_len()
        ),
        Shape::Audio {
            channels,
            sample_rate,
            bits_per_sample,
            frames,
        } => format!(
            "WAV {} Hz, {}-bit, {} channel(s), {} frames",
            sample_rate, bits_per_sample, channels, frames
        ),
    }
}
