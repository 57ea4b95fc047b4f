//! bithide - hide text in images and audio
//!
//! A CLI for LSB and PVD steganography over PNG/BMP images and PCM WAV audio.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bithide::config::Settings;
use commands::{CapacityCommand, CommandExecutor, ConfigCommand, EmbedCommand, ExtractCommand};

/// bithide - hide text in images and audio
///
/// Embeds a message in the least significant bits of an image or WAV file (lsb),
/// or in the differences of neighbouring pixels (pvd), and recovers it later.
#[derive(Parser)]
#[command(name = "bithide")]
#[command(version)]
#[command(about = "Hide text in images and WAV audio with LSB and PVD steganography")]
#[command(long_about = None)]
struct Cli {
    /// Verbose output (debug logging on stderr)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show how many characters a carrier can hide
    Capacity(CapacityCommand),

    /// Hide a message in a carrier
    Embed(EmbedCommand),

    /// Recover a hidden message
    Extract(ExtractCommand),

    /// Manage stored settings
    Config(ConfigCommand),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // A broken settings file must not lock the user out of `config reset`
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("WARNING: ignoring settings file: {}", e);
            Settings::default()
        }
    };

    init_logging(cli.verbose, &settings);

    let command: &dyn CommandExecutor = match &cli.command {
        Commands::Capacity(cmd) => cmd,
        Commands::Embed(cmd) => cmd,
        Commands::Extract(cmd) => cmd,
        Commands::Config(cmd) => cmd,
    };
    command.execute(&settings)
}

/// Installs the stderr log subscriber.
///
/// `RUST_LOG` wins, then `--verbose` (debug), then the configured level.
fn init_logging(verbose: bool, settings: &Settings) {
    let fallback = if verbose {
        "debug"
    } else {
        settings.log_level.as_str()
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
