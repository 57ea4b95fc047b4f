//! Embed command - hide a message in an image or WAV carrier.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use bithide::config::Settings;
use bithide::{embed_with_report, estimate_capacity, Carrier, Scheme};

use super::{describe, CommandExecutor};

/// Hide a message in a carrier and write the stego file.
///
/// The message is read from --message, --message-file, or stdin (in that order).
/// Characters must be in the one-byte range (U+0000 to U+00FF).
/// Write images as PNG or BMP: lossy formats destroy the hidden message.
#[derive(Args, Debug)]
pub struct EmbedCommand {
    /// Path to carrier file (PNG, BMP, ... or PCM WAV)
    pub carrier: PathBuf,

    /// Output path for the stego file
    #[arg(short, long)]
    pub output: PathBuf,

    /// Message to hide (mutually exclusive with --message-file)
    #[arg(short, long, conflicts_with = "message_file")]
    pub message: Option<String>,

    /// Read the message from a file (bytes are taken as Latin-1 characters)
    #[arg(long, conflicts_with = "message")]
    pub message_file: Option<PathBuf>,

    /// Embedding scheme: lsb or pvd
    #[arg(short, long)]
    pub scheme: Option<Scheme>,

    /// Allow a lossy output format (the message will most likely not survive)
    #[arg(long)]
    pub allow_lossy: bool,
}

impl EmbedCommand {
    fn read_message(&self) -> Result<String> {
        if let Some(message) = &self.message {
            return Ok(message.clone());
        }

        if let Some(path) = &self.message_file {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read message from {}", path.display()))?;
            return Ok(bytes.into_iter().map(char::from).collect());
        }

        let mut input = String::new();
        io::stdin()
            .read_to_string(&mut input)
            .context("Failed to read message from stdin")?;
        Ok(input.trim_end_matches(['\r', '\n']).to_string())
    }
}

impl CommandExecutor for EmbedCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        let scheme = self.scheme.unwrap_or(settings.default_scheme);
        let message = self.read_message()?;

        let carrier = Carrier::from_file(&self.carrier)
            .with_context(|| format!("Failed to read carrier from {}", self.carrier.display()))?;
        tracing::debug!("carrier: {}", describe(&carrier));

        let capacity = estimate_capacity(&carrier, scheme)
            .with_context(|| format!("Cannot use {} with this carrier", scheme))?;
        let chars = message.chars().count();
        if !capacity.fits(chars) {
            bail!(
                "Message is too long: {} characters, {} carrier holds at most {} with {}",
                chars,
                self.carrier.display(),
                capacity.message_chars(),
                scheme
            );
        }

        let embedded = embed_with_report(&carrier, &message, scheme)
            .context("Failed to embed message")?;
        embedded
            .artifact
            .save(&self.output, self.allow_lossy || settings.allow_lossy_output)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        println!(
            "Hidden {} characters in {} ({}: {}/{} bits used)",
            chars,
            self.output.display(),
            scheme,
            embedded.bits_used,
            embedded.capacity.bits()
        );
        Ok(())
    }
}
