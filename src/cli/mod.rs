//! Tradesim CLI
//!
//! Commands:
//! - `tradesim evaluate` - Run a policy through the environment on a price file
//! - `tradesim analyze` - Count the actions in an action log
//! - `tradesim config` - Configuration management

pub mod analyze;
pub mod config;
pub mod evaluate;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::AppConfig;

/// Single-asset trading environment for RL agents
#[derive(Parser, Debug)]
#[command(name = "tradesim")]
#[command(author, version, about = "Single-asset trading environment for RL agents")]
pub struct Cli {
    /// Directory holding default.toml and <profile>.toml
    #[arg(long, global = true, env = "TRADESIM_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a policy on historical prices
    Evaluate(evaluate::EvaluateArgs),

    /// Summarize an action log
    Analyze(analyze::AnalyzeArgs),

    /// Configuration management
    #[command(subcommand)]
    Config(config::ConfigCommands),
}

impl Cli {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        match self.command {
            Commands::Evaluate(args) => args.run(config),
            Commands::Analyze(args) => args.run(config),
            Commands::Config(cmd) => cmd.run(config),
        }
    }
}
