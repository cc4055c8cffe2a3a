//! `tradesim evaluate`

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::AppConfig;
use crate::data::load_close_prices;
use crate::rl::{
    run_episodes, summarize_episodes, write_equity_curve, CsvActionLog, DiscreteAction,
    EpisodeSummary, HoldPolicy, Policy, RandomPolicy, ScriptedPolicy, TracingEventHook,
    TradingEnvConfig, TradingEnvironment,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PolicyKind {
    /// Never trade after the opening purchase
    Hold,
    /// Uniformly random actions
    Random,
    /// Play `--actions`, then hold
    Scripted,
}

#[derive(Args, Debug)]
pub struct EvaluateArgs {
    /// Market data CSV (default: data.path from config)
    #[arg(short, long)]
    pub data: Option<PathBuf>,

    #[arg(short, long, value_enum, default_value_t = PolicyKind::Hold)]
    pub policy: PolicyKind,

    /// Actions for the scripted policy, e.g. hold,buy,sell or 0,1,2
    #[arg(long, value_delimiter = ',')]
    pub actions: Vec<DiscreteAction>,

    /// Seed for the random policy
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(short, long, default_value_t = 1)]
    pub episodes: usize,

    #[arg(long)]
    pub window_size: Option<usize>,

    #[arg(long)]
    pub initial_balance: Option<f64>,

    #[arg(long)]
    pub max_steps: Option<usize>,

    /// Action log path (default: output.action_log_path from config)
    #[arg(long)]
    pub log: Option<PathBuf>,

    /// Write the last episode's equity curve here
    #[arg(long)]
    pub equity_out: Option<PathBuf>,

    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl EvaluateArgs {
    pub fn run(self, config: &AppConfig) -> Result<()> {
        let env_config = self.env_config(config);
        env_config.validate()?;

        let data_path = self
            .data
            .clone()
            .or_else(|| config.data.path.clone())
            .context("No market data file: pass --data or set data.path")?;
        let prices = load_close_prices(&data_path, config.data.layout())
            .with_context(|| format!("Failed to load prices from {}", data_path.display()))?;

        let log_path = self
            .log
            .clone()
            .unwrap_or_else(|| config.output.action_log_path.clone());

        let mut env = TradingEnvironment::with_hooks(
            prices,
            env_config.clone(),
            Some(Box::new(CsvActionLog::new(&log_path))),
            Box::new(TracingEventHook),
        )?;

        let mut policy = self.build_policy();

        info!(
            policy = ?self.policy,
            episodes = self.episodes,
            data = %data_path.display(),
            "Starting evaluation"
        );

        let results = run_episodes(&mut env, policy.as_mut(), self.episodes)?;
        let summary = summarize_episodes(&results);

        let equity_path = self
            .equity_out
            .clone()
            .or_else(|| config.output.equity_curve_path.clone());
        if let (Some(path), Some(last)) = (equity_path, results.last()) {
            let file = File::create(&path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            write_equity_curve(file, &last.equity_curve)?;
            info!(path = %path.display(), "Equity curve written");
        }

        if self.json {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            print_summary(&env_config, &summary, &log_path);
        }

        Ok(())
    }

    fn env_config(&self, config: &AppConfig) -> TradingEnvConfig {
        let mut env_config = config.environment.clone();
        if let Some(window_size) = self.window_size {
            env_config.window_size = window_size;
        }
        if let Some(initial_balance) = self.initial_balance {
            env_config.initial_balance = initial_balance;
        }
        if let Some(max_steps) = self.max_steps {
            env_config.max_steps_per_episode = max_steps;
        }
        env_config
    }

    fn build_policy(&self) -> Box<dyn Policy> {
        match self.policy {
            PolicyKind::Hold => Box::new(HoldPolicy),
            PolicyKind::Random => Box::new(RandomPolicy::new(self.seed)),
            PolicyKind::Scripted => Box::new(ScriptedPolicy::new(self.actions.clone())),
        }
    }
}

fn print_summary(env_config: &TradingEnvConfig, summary: &EpisodeSummary, log_path: &Path) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Evaluation Summary                             ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  Window Size:     {:>10}                                   ║",
        env_config.window_size
    );
    println!(
        "║  Initial Balance: {:>10.2}                                   ║",
        env_config.initial_balance
    );
    println!(
        "║  Episodes:        {:>10}                                   ║",
        summary.num_episodes
    );
    println!(
        "║  Avg Profit:      {:>10.2}                                   ║",
        summary.avg_profit
    );
    println!(
        "║  Total Profit:    {:>10.2}                                   ║",
        summary.total_profit
    );
    println!(
        "║  Avg Trades:      {:>10.1}                                   ║",
        summary.avg_trades
    );
    println!(
        "║  Episode Win %:   {:>9.1}%                                   ║",
        summary.episode_win_rate * 100.0
    );
    println!(
        "║  Best / Worst:    {:>10.2} / {:<10.2}                      ║",
        summary.best_profit, summary.worst_profit
    );
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!("Action log: {}", log_path.display());
}
