//! Configuration management commands
//!
//! tradesim config show     - Show the effective configuration
//! tradesim config validate - Validate the effective configuration

use anyhow::Result;
use clap::Subcommand;

use crate::config::AppConfig;

/// Configuration-related commands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the configuration after files and environment are merged
    Show {
        /// Configuration section to show (environment, data, output, logging)
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Validate the merged configuration
    Validate,
}

impl ConfigCommands {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        match self {
            Self::Show { section } => show_config(config, section.as_deref()),
            Self::Validate => {
                config.validate()?;
                println!("Configuration is valid");
                Ok(())
            }
        }
    }
}

fn show_config(config: &AppConfig, section: Option<&str>) -> Result<()> {
    let rendered = match section {
        None => config.to_toml()?,
        Some("environment") => toml::to_string_pretty(&config.environment)?,
        Some("data") => toml::to_string_pretty(&config.data)?,
        Some("output") => toml::to_string_pretty(&config.output)?,
        Some("logging") => toml::to_string_pretty(&config.logging)?,
        Some(other) => anyhow::bail!("Unknown configuration section: {other}"),
    };
    println!("{rendered}");
    Ok(())
}
