//! Environment events
//!
//! The environment reports what happens in an episode through an
//! [`EnvEventHook`] instead of writing output itself.

use tracing::{debug, info, warn};

use crate::rl::core::DiscreteAction;

/// Something that happened inside the environment
#[derive(Debug, Clone, PartialEq)]
pub enum EnvEvent {
    /// Episode state was reinitialized. `opened` is false when the opening
    /// purchase could not be afforded.
    Reset {
        step: usize,
        price: f64,
        balance: f64,
        opened: bool,
    },
    /// A Buy or Sell was executed
    Trade {
        step: usize,
        action: DiscreteAction,
        price: f64,
        balance: f64,
        reward: f64,
    },
    /// An open position was closed because the episode ended
    Liquidation {
        step: usize,
        price: f64,
        balance: f64,
        reward: f64,
    },
    /// The episode reached its terminal state
    EpisodeEnd {
        step: usize,
        episode_steps: usize,
        trades: usize,
        final_balance: f64,
        total_profit: f64,
    },
}

/// Receiver for environment events
pub trait EnvEventHook: Send {
    fn on_event(&mut self, event: &EnvEvent);
}

/// Emits every event as a structured `tracing` record
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventHook;

impl EnvEventHook for TracingEventHook {
    fn on_event(&mut self, event: &EnvEvent) {
        match *event {
            EnvEvent::Reset {
                step,
                price,
                balance,
                opened: true,
            } => info!(step, price, balance, "Reset with opening purchase"),
            EnvEvent::Reset {
                step,
                price,
                balance,
                opened: false,
            } => warn!(step, price, balance, "Reset without opening purchase: balance below price"),
            EnvEvent::Trade {
                step,
                action,
                price,
                balance,
                reward,
            } => debug!(step, %action, price, balance, reward, "Trade executed"),
            EnvEvent::Liquidation {
                step,
                price,
                balance,
                reward,
            } => debug!(step, price, balance, reward, "Position liquidated at episode end"),
            EnvEvent::EpisodeEnd {
                step,
                episode_steps,
                trades,
                final_balance,
                total_profit,
            } => info!(
                step,
                episode_steps, trades, final_balance, total_profit, "Episode finished"
            ),
        }
    }
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEventHook;

impl EnvEventHook for NoopEventHook {
    fn on_event(&mut self, _event: &EnvEvent) {}
}
