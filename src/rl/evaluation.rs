//! Evaluation Loop
//!
//! Drives an environment with a policy from reset to done and collects the
//! equity curve and episode statistics.

use std::io;

use csv::Writer;
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Result, TradesimError};
use crate::rl::environment::{StepResult, TradingEnvironment};
use crate::rl::policy::Policy;

/// Outcome of one evaluated episode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// Portfolio value after reset and after every step, marked at the
    /// price of the step just taken
    pub equity_curve: Vec<f64>,
    pub total_profit: f64,
    pub trades: usize,
    pub total_reward: f64,
    /// Steps taken by the policy
    pub steps: usize,
    /// Set when the episode finished but its action log could not be written
    pub log_error: Option<String>,
}

impl EvaluationResult {
    pub fn final_equity(&self) -> Option<f64> {
        self.equity_curve.last().copied()
    }
}

/// Run one episode of `policy` in `env`, starting with a reset
pub fn evaluate_agent(
    env: &mut TradingEnvironment,
    policy: &mut dyn Policy,
) -> Result<EvaluationResult> {
    let (mut observation, _) = env.reset(None)?;
    policy.on_episode_start();

    let mut equity_curve = vec![env.balance()];
    let mut total_reward = 0.0;
    let mut steps = 0;
    let mut log_error = None;

    loop {
        let action = policy.act(&observation);

        let result: StepResult = match env.step(action) {
            Ok(result) => result,
            Err(TradesimError::ActionLogWrite { reason, outcome }) => {
                warn!(%reason, "Episode finished but the action log was not written");
                log_error = Some(reason);
                *outcome
            }
            Err(e) => return Err(e),
        };

        steps += 1;
        total_reward += result.reward;
        policy.observe(&result.observation, result.reward, result.done);
        equity_curve.push(mark_to_market(env));

        if result.done {
            break;
        }
        observation = result.observation;
    }

    let total_profit = env
        .total_profit()
        .unwrap_or(env.balance() - env.config().initial_balance);

    Ok(EvaluationResult {
        equity_curve,
        total_profit,
        trades: env.trades(),
        total_reward,
        steps,
        log_error,
    })
}

fn mark_to_market(env: &TradingEnvironment) -> f64 {
    let last_price = env
        .prices()
        .get(env.current_step().saturating_sub(1))
        .unwrap_or(0.0);
    env.balance() + f64::from(env.shares_held()) * last_price
}

/// Evaluate `episodes` consecutive episodes with the same policy
pub fn run_episodes(
    env: &mut TradingEnvironment,
    policy: &mut dyn Policy,
    episodes: usize,
) -> Result<Vec<EvaluationResult>> {
    let mut results = Vec::with_capacity(episodes);

    for episode in 0..episodes {
        let result = evaluate_agent(env, policy)?;
        info!(
            episode,
            total_profit = result.total_profit,
            trades = result.trades,
            steps = result.steps,
            "Episode evaluated"
        );
        results.push(result);
    }

    Ok(results)
}

/// Summary statistics over evaluated episodes
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EpisodeSummary {
    pub num_episodes: usize,
    pub avg_profit: f64,
    pub total_profit: f64,
    pub avg_trades: f64,
    pub avg_reward: f64,
    /// Fraction of episodes that ended with a profit
    pub episode_win_rate: f64,
    pub best_profit: f64,
    pub worst_profit: f64,
}

pub fn summarize_episodes(results: &[EvaluationResult]) -> EpisodeSummary {
    if results.is_empty() {
        return EpisodeSummary::default();
    }

    let n = results.len() as f64;
    let total_profit: f64 = results.iter().map(|r| r.total_profit).sum();
    let winning_episodes = results.iter().filter(|r| r.total_profit > 0.0).count();

    EpisodeSummary {
        num_episodes: results.len(),
        avg_profit: total_profit / n,
        total_profit,
        avg_trades: results.iter().map(|r| r.trades as f64).sum::<f64>() / n,
        avg_reward: results.iter().map(|r| r.total_reward).sum::<f64>() / n,
        episode_win_rate: winning_episodes as f64 / n,
        best_profit: results
            .iter()
            .map(|r| r.total_profit)
            .fold(f64::NEG_INFINITY, f64::max),
        worst_profit: results
            .iter()
            .map(|r| r.total_profit)
            .fold(f64::INFINITY, f64::min),
    }
}

/// Write an equity curve as `step,equity` CSV
pub fn write_equity_curve<W: io::Write>(writer: W, equity_curve: &[f64]) -> Result<()> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(["step", "equity"])?;
    for (step, equity) in equity_curve.iter().enumerate() {
        writer.write_record([step.to_string(), equity.to_string()])?;
    }
    writer.flush()?;
    Ok(())
}
