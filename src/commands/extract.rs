//! Extract command - recover a hidden message from a stego file.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use bithide::config::Settings;
use bithide::{extract, extract_any, Carrier, Scheme};

use super::CommandExecutor;

/// Recover a message hidden with `bithide embed`.
///
/// Fails (non-zero exit) when no message is found: the carrier holds none,
/// the wrong scheme was chosen, or the file was recompressed.
#[derive(Args, Debug)]
pub struct ExtractCommand {
    /// Path to the stego file
    pub carrier: PathBuf,

    /// Embedding scheme: lsb or pvd
    #[arg(short, long, conflicts_with = "any")]
    pub scheme: Option<Scheme>,

    /// Try every scheme and report the first that finds a message
    #[arg(long)]
    pub any: bool,

    /// Write the message to a file (one byte per character) instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl CommandExecutor for ExtractCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        let carrier = Carrier::from_file(&self.carrier)
            .with_context(|| format!("Failed to read carrier from {}", self.carrier.display()))?;

        let result = if self.any {
            extract_any(&carrier)
        } else {
            let scheme = self.scheme.unwrap_or(settings.default_scheme);
            extract(&carrier, scheme).map(|message| (scheme, message))
        };
        let (scheme, message) = result
            .with_context(|| format!("Failed to extract from {}", self.carrier.display()))?;

        tracing::info!(%scheme, chars = message.chars().count(), "message recovered");

        match &self.output {
            Some(path) => {
                // Characters are one byte each by construction
                let bytes: Vec<u8> = message.chars().map(|c| c as u32 as u8).collect();
                std::fs::write(path, bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                eprintln!("Message written to {}", path.display());
            }
            None => println!("{}", message),
        }
        Ok(())
    }
}
