//! `tradesim analyze`

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::rl::environment::{read_action_log, replay};
use crate::rl::ActionCounts;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Action log to read (default: output.action_log_path from config)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Starting cash for the replay (default: environment.initial_balance)
    #[arg(long)]
    pub initial_balance: Option<f64>,
}

impl AnalyzeArgs {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let path = self
            .log
            .unwrap_or_else(|| config.output.action_log_path.clone());
        let entries = read_action_log(&path)
            .with_context(|| format!("Failed to read action log {}", path.display()))?;

        let counts = ActionCounts::tally(&entries);
        let initial_balance = self
            .initial_balance
            .unwrap_or(config.environment.initial_balance);
        let outcome = replay(&entries, initial_balance);

        println!("╔══════════════════════════════════════════════════════════════╗");
        println!("║               Action Log                                     ║");
        println!("╠══════════════════════════════════════════════════════════════╣");
        println!(
            "║  Rows:            {:>10}                                   ║",
            counts.total()
        );
        println!(
            "║  Hold:            {:>10}                                   ║",
            counts.hold
        );
        println!(
            "║  Buy:             {:>10}                                   ║",
            counts.buy
        );
        println!(
            "║  Sell:            {:>10}                                   ║",
            counts.sell
        );
        println!(
            "║  Final Balance:   {:>10.2}                                   ║",
            outcome.final_balance
        );
        println!(
            "║  Total Profit:    {:>10.2}                                   ║",
            outcome.total_profit
        );
        println!("╚══════════════════════════════════════════════════════════════╝");

        Ok(())
    }
}
