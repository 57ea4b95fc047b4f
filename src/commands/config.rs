//! Config command - inspect and change stored settings.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use bithide::config::Settings;

use super::CommandExecutor;

/// Manage settings in ~/.bithide/config.toml
#[derive(Args, Debug)]
pub struct ConfigCommand {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Print the current settings
    Show,

    /// Print the settings file path
    Path,

    /// Change one setting (default_scheme, log_level, allow_lossy_output)
    Set {
        /// Setting name
        key: String,
        /// New value
        value: String,
    },

    /// Restore default settings
    Reset,
}

impl CommandExecutor for ConfigCommand {
    fn execute(&self, settings: &Settings) -> Result<()> {
        match &self.action {
            ConfigAction::Show => {
                let content = toml::to_string_pretty(settings).context("Failed to render settings")?;
                print!("{}", content);
            }
            ConfigAction::Path => {
                println!("{}", Settings::config_path()?.display());
            }
            ConfigAction::Set { key, value } => {
                let mut updated = settings.clone();
                updated.set(key, value).with_context(|| {
                    format!("Valid settings: {}", Settings::KEYS.join(", "))
                })?;
                updated.save().context("Failed to save settings")?;
                println!("{} = {}", key, value);
            }
            ConfigAction::Reset => {
                Settings::default()
                    .save()
                    .context("Failed to save settings")?;
                println!("Settings reset to defaults");
            }
        }
        Ok(())
    }
}
