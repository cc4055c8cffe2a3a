//! Trading Environment for RL Training
//!
//! A gym-like environment that replays a historical closing price series
//! and turns Hold/Buy/Sell decisions into account transitions and rewards.

mod account;
pub mod action_log;
mod events;
mod observation;
mod trading;

pub use account::Account;
pub use action_log::{
    read_action_log, replay, ActionCounts, ActionLogEntry, ActionLogSink, CsvActionLog,
    MemoryActionLog, ReplayOutcome, ReplayState, ACTION_LOG_HEADER,
};
pub use events::{EnvEvent, EnvEventHook, NoopEventHook, TracingEventHook};
pub use observation::build_observation;
pub use trading::{StepInfo, StepResult, TradingEnvironment};
