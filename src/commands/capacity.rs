//! Capacity command - report how much text a carrier can hold.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use bithide::config::Settings;
use bithide::{estimate_capacity, Carrier, Scheme};

use super::{describe, CommandExecutor};

/// Show how many characters a carrier can hide.
///
/// Without --scheme, reports the configured default scheme.
/// With --all, reports every scheme the carrier supports.
#[derive(Args, Debug)]
pub struct CapacityCommand {
    /// Path to carrier file (PNG, BMP, ... or PCM WAV)
    pub carrier: PathBuf,

    /// Embedding scheme: lsb or pvd
    #[arg(short, long, conflicts_with = "all")]
    pub scheme: Option<Scheme>,

    /// Report every scheme
    #[arg(long)]
    pub all: bool,
}

impl CommandExecutor for CapacityCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        let carrier = Carrier::from_file(&self.carrier)
            .with_context(|| format!("Failed to read carrier from {}", self.carrier.display()))?;

        println!("{}: {}", self.carrier.display(), describe(&carrier));

        let schemes: Vec<Scheme> = if self.all {
            Scheme::ALL
                .into_iter()
                .filter(|scheme| *scheme == Scheme::Lsb || carrier.is_image())
                .collect()
        } else {
            vec![self.scheme.unwrap_or(settings.default_scheme)]
        };

        for scheme in schemes {
            let capacity = estimate_capacity(&carrier, scheme)
                .with_context(|| format!("Cannot estimate {} capacity", scheme))?;
            println!(
                "  {}: {} bits ({} bytes), up to {} characters",
                scheme,
                capacity.bits(),
                capacity.bytes(),
                capacity.message_chars()
            );
        }

        Ok(())
    }
}
