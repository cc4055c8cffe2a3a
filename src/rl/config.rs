//! Environment Configuration
//!
//! Constructor-time parameters for the trading environment. Immutable for
//! the lifetime of an episode.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TradesimError};

/// Trading environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TradingEnvConfig {
    /// Number of trailing closing prices in each observation
    pub window_size: usize,
    /// Starting cash
    pub initial_balance: f64,
    /// Per-trade cost multiplier. Carried through the interface but not
    /// applied to fills.
    pub transaction_cost: f64,
    /// Hard cap on steps per episode
    pub max_steps_per_episode: usize,
}

impl Default for TradingEnvConfig {
    fn default() -> Self {
        Self {
            window_size: 10,
            initial_balance: 10_000.0,
            transaction_cost: 0.0,
            max_steps_per_episode: 100,
        }
    }
}

impl TradingEnvConfig {
    /// Length of the observation vector: the price window plus the cash and
    /// position features
    pub fn observation_dim(&self) -> usize {
        self.window_size + 2
    }

    /// Minimum number of prices a series needs for `reset` to succeed
    pub fn min_series_len(&self) -> usize {
        self.window_size + 1
    }

    /// Reject values the environment cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.window_size == 0 {
            return Err(TradesimError::Validation(
                "window_size must be at least 1".to_string(),
            ));
        }
        if !self.initial_balance.is_finite() || self.initial_balance <= 0.0 {
            return Err(TradesimError::Validation(format!(
                "initial_balance must be positive and finite, got {}",
                self.initial_balance
            )));
        }
        if !self.transaction_cost.is_finite() || self.transaction_cost < 0.0 {
            return Err(TradesimError::Validation(format!(
                "transaction_cost must be non-negative, got {}",
                self.transaction_cost
            )));
        }
        if self.max_steps_per_episode == 0 {
            return Err(TradesimError::Validation(
                "max_steps_per_episode must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TradingEnvConfig::default();
        assert_eq!(config.window_size, 10);
        assert_eq!(config.initial_balance, 10_000.0);
        assert_eq!(config.transaction_cost, 0.0);
        assert_eq!(config.max_steps_per_episode, 100);
        assert_eq!(config.observation_dim(), 12);
        assert_eq!(config.min_series_len(), 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let bad = [
            TradingEnvConfig { window_size: 0, ..Default::default() },
            TradingEnvConfig { initial_balance: 0.0, ..Default::default() },
            TradingEnvConfig { initial_balance: f64::NAN, ..Default::default() },
            TradingEnvConfig { transaction_cost: -0.1, ..Default::default() },
            TradingEnvConfig { max_steps_per_episode: 0, ..Default::default() },
        ];

        for config in bad {
            assert!(
                matches!(config.validate(), Err(TradesimError::Validation(_))),
                "expected validation error for {:?}",
                config
            );
        }
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let config: TradingEnvConfig = serde_json::from_str(r#"{"window_size": 5}"#).unwrap();
        assert_eq!(config.window_size, 5);
        assert_eq!(config.max_steps_per_episode, 100);
    }
}
