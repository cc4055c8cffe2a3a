//! Reinforcement Learning Module
//!
//! A discrete-action trading environment over historical closing prices,
//! plus the policies and evaluation loop used to drive it.
//!
//! # Features
//!
//! - **Action Space**: Discrete Hold/Buy/Sell on a single unit
//! - **Observation**: Normalized price window with cash and position flags
//! - **Reward**: Realized P&L, paid when a position is closed
//! - **Action Log**: Per-episode CSV log that can be tallied and replayed

pub mod config;
pub mod core;
pub mod environment;
pub mod evaluation;
pub mod policy;

pub use config::TradingEnvConfig;

pub use core::{DiscreteAction, NUM_DISCRETE_ACTIONS};

pub use environment::{
    ActionCounts, ActionLogEntry, ActionLogSink, CsvActionLog, EnvEvent, EnvEventHook,
    MemoryActionLog, NoopEventHook, StepInfo, StepResult, TracingEventHook, TradingEnvironment,
};

pub use evaluation::{
    evaluate_agent, run_episodes, summarize_episodes, write_equity_curve, EpisodeSummary,
    EvaluationResult,
};

pub use policy::{HoldPolicy, Policy, RandomPolicy, ScriptedPolicy};
