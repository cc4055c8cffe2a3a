//! Action Space
//!
//! Discrete action space of the trading environment.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TradesimError;

/// Number of discrete actions
pub const NUM_DISCRETE_ACTIONS: usize = 3;

/// Discrete action chosen by the agent at each step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum DiscreteAction {
    /// Do nothing
    #[default]
    Hold = 0,
    /// Open a one-unit position
    Buy = 1,
    /// Close the open position
    Sell = 2,
}

impl DiscreteAction {
    /// Convert from action index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Hold),
            1 => Some(Self::Buy),
            2 => Some(Self::Sell),
            _ => None,
        }
    }

    /// Convert to action index
    pub fn to_index(self) -> usize {
        self as usize
    }

    /// Get all possible actions
    pub fn all() -> &'static [DiscreteAction] {
        &[Self::Hold, Self::Buy, Self::Sell]
    }

    pub fn is_trade(&self) -> bool {
        !matches!(self, Self::Hold)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hold => "hold",
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl TryFrom<usize> for DiscreteAction {
    type Error = TradesimError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(TradesimError::InvalidAction(index))
    }
}

/// Accepts an action name (`hold`, `buy`, `sell`, any case) or its index
impl FromStr for DiscreteAction {
    type Err = TradesimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(index) = s.parse::<usize>() {
            return Self::try_from(index);
        }
        Self::all()
            .iter()
            .copied()
            .find(|action| action.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| TradesimError::Validation(format!("unknown action '{s}'")))
    }
}

impl fmt::Display for DiscreteAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
