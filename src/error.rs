use thiserror::Error;

use crate::rl::environment::StepResult;

/// Main error type for the trading environment
#[derive(Error, Debug)]
pub enum TradesimError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    Validation(String),

    // Market data errors
    #[error("Invalid price series: {0}")]
    InvalidPriceSeries(String),

    #[error("Invalid action log: {0}")]
    InvalidActionLog(String),

    // Caller contract violations
    #[error("Invalid action index: {0} (expected 0 = Hold, 1 = Buy, 2 = Sell)")]
    InvalidAction(usize),

    #[error("Episode already finished; call reset() before stepping again")]
    EpisodeFinished,

    /// The terminal step completed but persisting the action log failed.
    /// The finished step is carried so the episode result is not lost.
    #[error("Action log write failed: {reason}")]
    ActionLogWrite {
        reason: String,
        outcome: Box<StepResult>,
    },

    // Serialization errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for TradesimError
pub type Result<T> = std::result::Result<T, TradesimError>;

impl TradesimError {
    /// Terminal step outcome attached to an action log failure
    pub fn step_outcome(&self) -> Option<&StepResult> {
        match self {
            Self::ActionLogWrite { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}
