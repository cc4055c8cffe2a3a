//! Trading Environment for RL Training
//!
//! Provides a gym-like interface with step/reset over a historical closing
//! price series. One unit can be held at a time; reward is realized P&L and
//! is paid only when a position is closed.
//!
//! Calls are strictly sequential: `reset` and `step` take `&mut self`, so an
//! environment has a single owner. Separate environments share nothing and
//! can run on separate threads.

use std::collections::BTreeMap;

use super::account::Account;
use super::action_log::{ActionLogEntry, ActionLogSink};
use super::events::{EnvEvent, EnvEventHook, TracingEventHook};
use super::observation::build_observation;
use crate::data::PriceSeries;
use crate::error::{Result, TradesimError};
use crate::rl::config::TradingEnvConfig;
use crate::rl::core::{DiscreteAction, NUM_DISCRETE_ACTIONS};

/// Auxiliary information returned with each transition. The environment
/// never fills it.
pub type StepInfo = BTreeMap<String, f64>;

/// Result of taking a step in the environment
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Observation after the transition
    pub observation: Vec<f32>,
    /// Realized P&L of a position closed during this step, otherwise 0
    pub reward: f64,
    /// Whether the episode has ended
    pub done: bool,
    /// Always false: the step cap is reported through `done`
    pub truncated: bool,
    pub info: StepInfo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EpisodeStatus {
    Active,
    Done,
}

/// Trading environment for RL training
pub struct TradingEnvironment {
    config: TradingEnvConfig,
    prices: PriceSeries,
    account: Account,
    current_step: usize,
    episode_steps: usize,
    trades: usize,
    total_profit: f64,
    status: EpisodeStatus,
    action_log: Vec<ActionLogEntry>,
    log_sink: Option<Box<dyn ActionLogSink>>,
    event_hook: Box<dyn EnvEventHook>,
}

impl TradingEnvironment {
    /// Create an environment that reports through `tracing` and keeps the
    /// action log in memory only. The first episode is started immediately.
    pub fn new(prices: PriceSeries, config: TradingEnvConfig) -> Result<Self> {
        Self::with_hooks(prices, config, None, Box::new(TracingEventHook))
    }

    /// Create an environment with an action log sink and event hook. The
    /// first episode is started immediately.
    pub fn with_hooks(
        prices: PriceSeries,
        config: TradingEnvConfig,
        log_sink: Option<Box<dyn ActionLogSink>>,
        event_hook: Box<dyn EnvEventHook>,
    ) -> Result<Self> {
        config.validate()?;

        let mut env = Self {
            account: Account::new(config.initial_balance),
            current_step: config.window_size,
            episode_steps: 0,
            trades: 0,
            total_profit: 0.0,
            status: EpisodeStatus::Active,
            action_log: Vec::new(),
            config,
            prices,
            log_sink,
            event_hook,
        };

        env.reset(None)?;
        Ok(env)
    }

    /// Reset the environment for a new episode.
    ///
    /// Immediately buys one unit at the first tradable price when the
    /// starting cash covers it, so episodes normally start in position.
    /// The environment is deterministic; `seed` is accepted for interface
    /// compatibility and ignored.
    pub fn reset(&mut self, _seed: Option<u64>) -> Result<(Vec<f32>, StepInfo)> {
        if self.prices.len() < self.config.min_series_len() {
            return Err(TradesimError::InvalidPriceSeries(format!(
                "need at least {} prices for window_size {}, got {}",
                self.config.min_series_len(),
                self.config.window_size,
                self.prices.len()
            )));
        }

        self.account = Account::new(self.config.initial_balance);
        self.current_step = self.config.window_size;
        self.episode_steps = 0;
        self.trades = 0;
        self.total_profit = 0.0;
        self.status = EpisodeStatus::Active;
        self.action_log.clear();

        let price = self.current_price()?;
        let opened = self.account.buy(price);
        if opened {
            self.trades += 1;
            let entry = self.log_entry(DiscreteAction::Buy, price);
            self.action_log.push(entry);
        }

        self.event_hook.on_event(&EnvEvent::Reset {
            step: self.current_step,
            price,
            balance: self.account.balance(),
            opened,
        });

        Ok((self.get_observation(), StepInfo::new()))
    }

    /// Take a step given an action index (0 = Hold, 1 = Buy, 2 = Sell)
    pub fn step_index(&mut self, action: usize) -> Result<StepResult> {
        let action = DiscreteAction::try_from(action)?;
        self.step(action)
    }

    /// Take a step in the environment.
    ///
    /// When the episode ends with a position open, the position is sold at
    /// this step's price and its P&L becomes the reward. If the action log
    /// cannot be persisted at episode end, the finished step is returned
    /// inside [`TradesimError::ActionLogWrite`].
    pub fn step(&mut self, action: DiscreteAction) -> Result<StepResult> {
        if self.status == EpisodeStatus::Done {
            return Err(TradesimError::EpisodeFinished);
        }

        let price = self.current_price()?;
        let entry = self.log_entry(action, price);
        self.action_log.push(entry);

        let mut reward = 0.0;
        match action {
            DiscreteAction::Buy => {
                if self.account.buy(price) {
                    self.trades += 1;
                    self.emit_trade(action, price, reward);
                }
            }
            DiscreteAction::Sell => {
                if let Some(pnl) = self.account.sell(price) {
                    reward = pnl;
                    self.trades += 1;
                    self.emit_trade(action, price, reward);
                }
            }
            DiscreteAction::Hold => {}
        }

        self.current_step += 1;
        self.episode_steps += 1;

        let done = self.current_step >= self.prices.len()
            || self.episode_steps >= self.config.max_steps_per_episode;

        if done {
            // A Sell above already left the account flat, so this only fires
            // when the position survived the step.
            if let Some(pnl) = self.account.sell(price) {
                reward += pnl;
                self.event_hook.on_event(&EnvEvent::Liquidation {
                    step: self.current_step,
                    price,
                    balance: self.account.balance(),
                    reward,
                });
            }

            self.total_profit = self.account.balance() - self.config.initial_balance;
            self.status = EpisodeStatus::Done;

            self.event_hook.on_event(&EnvEvent::EpisodeEnd {
                step: self.current_step,
                episode_steps: self.episode_steps,
                trades: self.trades,
                final_balance: self.account.balance(),
                total_profit: self.total_profit,
            });
        }

        let result = StepResult {
            observation: self.get_observation(),
            reward,
            done,
            truncated: false,
            info: StepInfo::new(),
        };

        if done {
            if let Err(e) = self.write_action_log() {
                return Err(TradesimError::ActionLogWrite {
                    reason: e.to_string(),
                    outcome: Box::new(result),
                });
            }
        }

        Ok(result)
    }

    /// Observation for the current state: the `window_size` prices before
    /// `current_step`, normalized to the first of them, then cash change and
    /// the position flag.
    pub fn get_observation(&self) -> Vec<f32> {
        let start = self.current_step - self.config.window_size;
        let window = self
            .prices
            .window(start..self.current_step)
            .unwrap_or_default();

        build_observation(
            window,
            self.account.balance(),
            self.config.initial_balance,
            self.account.shares_held(),
        )
    }

    /// One-line summary of the episode state
    pub fn render(&self) -> String {
        format!(
            "Step: {}, Balance: {}, Shares held: {}, Total profit: {}",
            self.current_step,
            self.account.balance(),
            self.account.shares_held(),
            self.total_profit
        )
    }

    fn current_price(&self) -> Result<f64> {
        self.prices.get(self.current_step).ok_or_else(|| {
            TradesimError::InvalidPriceSeries(format!(
                "no price at step {} (series length {})",
                self.current_step,
                self.prices.len()
            ))
        })
    }

    fn log_entry(&self, action: DiscreteAction, price: f64) -> ActionLogEntry {
        ActionLogEntry {
            step: self.current_step,
            action,
            balance: self.account.balance(),
            shares_held: self.account.shares_held(),
            price,
        }
    }

    fn emit_trade(&mut self, action: DiscreteAction, price: f64, reward: f64) {
        self.event_hook.on_event(&EnvEvent::Trade {
            step: self.current_step,
            action,
            price,
            balance: self.account.balance(),
            reward,
        });
    }

    fn write_action_log(&mut self) -> Result<()> {
        match self.log_sink.as_mut() {
            Some(sink) => sink.write_episode(&self.action_log),
            None => Ok(()),
        }
    }

    /// Get observation dimension
    pub fn observation_dim(&self) -> usize {
        self.config.observation_dim()
    }

    /// Get action dimension
    pub fn action_dim(&self) -> usize {
        NUM_DISCRETE_ACTIONS
    }

    pub fn config(&self) -> &TradingEnvConfig {
        &self.config
    }

    pub fn prices(&self) -> &PriceSeries {
        &self.prices
    }

    /// Reserved cost multiplier; not applied to fills
    pub fn transaction_cost(&self) -> f64 {
        self.config.transaction_cost
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn episode_steps(&self) -> usize {
        self.episode_steps
    }

    pub fn balance(&self) -> f64 {
        self.account.balance()
    }

    pub fn shares_held(&self) -> u8 {
        self.account.shares_held()
    }

    /// Entry price of the open position
    pub fn prev_buy_price(&self) -> Option<f64> {
        self.account.entry_price()
    }

    /// Executed Buy and Sell transitions this episode, including the opening
    /// purchase
    pub fn trades(&self) -> usize {
        self.trades
    }

    /// `balance - initial_balance`, available once the episode is done
    pub fn total_profit(&self) -> Option<f64> {
        self.is_done().then_some(self.total_profit)
    }

    pub fn is_done(&self) -> bool {
        self.status == EpisodeStatus::Done
    }

    /// Action log of the current episode so far
    pub fn action_log(&self) -> &[ActionLogEntry] {
        &self.action_log
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::environment::action_log::MockActionLogSink;
    use crate::rl::environment::events::NoopEventHook;

    fn prices(values: &[f64]) -> PriceSeries {
        PriceSeries::new(values.to_vec()).unwrap()
    }

    fn small_config() -> TradingEnvConfig {
        TradingEnvConfig {
            window_size: 10,
            initial_balance: 100.0,
            ..Default::default()
        }
    }

    fn quiet_env(values: &[f64], config: TradingEnvConfig) -> TradingEnvironment {
        TradingEnvironment::with_hooks(prices(values), config, None, Box::new(NoopEventHook))
            .unwrap()
    }

    #[test]
    fn test_env_creation() {
        let env = quiet_env(&[10.0; 12], small_config());

        assert_eq!(env.observation_dim(), 12);
        assert_eq!(env.action_dim(), 3);
        assert_eq!(env.current_step(), 10);
        assert!(!env.is_done());
    }

    #[test]
    fn test_env_reset_forces_purchase() {
        let mut env = quiet_env(&[10.0; 12], small_config());

        let (obs, info) = env.reset(Some(7)).unwrap();
        assert_eq!(obs.len(), 12);
        assert!(info.is_empty());
        assert_eq!(env.balance(), 90.0);
        assert_eq!(env.shares_held(), 1);
        assert_eq!(env.prev_buy_price(), Some(10.0));
        assert_eq!(env.trades(), 1);
        assert_eq!(env.episode_steps(), 0);
        assert_eq!(env.action_log().len(), 1);
        assert_eq!(env.total_profit(), None);
    }

    #[test]
    fn test_series_too_short() {
        let result = TradingEnvironment::with_hooks(
            prices(&[10.0; 10]),
            small_config(),
            None,
            Box::new(NoopEventHook),
        );
        assert!(matches!(result, Err(TradesimError::InvalidPriceSeries(_))));
    }

    #[test]
    fn test_env_step_hold() {
        let mut env = quiet_env(&[10.0; 15], small_config());

        let result = env.step(DiscreteAction::Hold).unwrap();
        assert!(!result.done);
        assert!(!result.truncated);
        assert_eq!(result.reward, 0.0);
        assert_eq!(result.observation.len(), 12);
        assert_eq!(env.current_step(), 11);
        assert_eq!(env.episode_steps(), 1);
    }

    #[test]
    fn test_buy_while_holding_is_noop() {
        let mut env = quiet_env(&[10.0; 15], small_config());

        let result = env.step(DiscreteAction::Buy).unwrap();
        assert_eq!(result.reward, 0.0);
        assert_eq!(env.balance(), 90.0);
        assert_eq!(env.trades(), 1);
    }

    #[test]
    fn test_sell_when_flat_is_noop() {
        let mut env = quiet_env(&[10.0; 15], small_config());
        env.step(DiscreteAction::Sell).unwrap();
        assert_eq!(env.shares_held(), 0);

        let result = env.step(DiscreteAction::Sell).unwrap();
        assert_eq!(result.reward, 0.0);
        assert_eq!(env.trades(), 2);
    }

    #[test]
    fn test_env_buy_sell_cycle() {
        let mut values = vec![10.0; 10];
        values.extend([10.0, 11.0, 9.0, 13.0, 13.0]);
        let mut env = quiet_env(&values, small_config());

        let result = env.step(DiscreteAction::Sell).unwrap();
        assert_eq!(result.reward, 1.0);
        assert_eq!(env.balance(), 101.0);

        let result = env.step(DiscreteAction::Buy).unwrap();
        assert_eq!(result.reward, 0.0);
        assert_eq!(env.balance(), 92.0);
        assert_eq!(env.prev_buy_price(), Some(9.0));

        let result = env.step(DiscreteAction::Sell).unwrap();
        assert_eq!(result.reward, 4.0);
        assert_eq!(env.balance(), 105.0);
        assert_eq!(env.trades(), 4);
    }

    #[test]
    fn test_episode_ends_at_step_cap() {
        let config = TradingEnvConfig {
            max_steps_per_episode: 3,
            ..small_config()
        };
        let mut env = quiet_env(&[10.0; 30], config);

        assert!(!env.step(DiscreteAction::Hold).unwrap().done);
        assert!(!env.step(DiscreteAction::Hold).unwrap().done);
        let last = env.step(DiscreteAction::Hold).unwrap();
        assert!(last.done);
        assert!(!last.truncated);
        assert_eq!(env.episode_steps(), 3);
        assert_eq!(env.shares_held(), 0);
        assert_eq!(env.total_profit(), Some(0.0));
    }

    #[test]
    fn test_step_after_done_is_rejected() {
        let mut env = quiet_env(&[10.0; 11], small_config());

        assert!(env.step(DiscreteAction::Hold).unwrap().done);
        assert!(matches!(
            env.step(DiscreteAction::Hold),
            Err(TradesimError::EpisodeFinished)
        ));

        env.reset(None).unwrap();
        assert!(!env.is_done());
    }

    #[test]
    fn test_invalid_action_index() {
        let mut env = quiet_env(&[10.0; 12], small_config());
        assert!(matches!(
            env.step_index(3),
            Err(TradesimError::InvalidAction(3))
        ));
        assert_eq!(env.current_step(), 10);
        assert_eq!(env.action_log().len(), 1);
    }

    #[test]
    fn test_log_written_once_at_episode_end() {
        let mut sink = MockActionLogSink::new();
        sink.expect_write_episode()
            .withf(|entries| entries.len() == 2)
            .times(1)
            .returning(|_| Ok(()));

        let mut values = vec![10.0; 11];
        values.push(12.0);
        let mut env = TradingEnvironment::with_hooks(
            prices(&values),
            small_config(),
            Some(Box::new(sink)),
            Box::new(NoopEventHook),
        )
        .unwrap();

        let result = env.step(DiscreteAction::Sell).unwrap();
        assert!(result.done);
    }

    #[test]
    fn test_log_failure_still_returns_result() {
        let mut sink = MockActionLogSink::new();
        sink.expect_write_episode().times(1).returning(|_| {
            Err(TradesimError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "read-only",
            )))
        });

        let mut env = TradingEnvironment::with_hooks(
            prices(&[10.0; 11]),
            small_config(),
            Some(Box::new(sink)),
            Box::new(NoopEventHook),
        )
        .unwrap();

        let err = env.step(DiscreteAction::Hold).unwrap_err();
        let outcome = err.step_outcome().expect("outcome attached");
        assert!(outcome.done);
        assert_eq!(outcome.reward, 0.0);
        assert!(env.is_done());
        assert_eq!(env.total_profit(), Some(0.0));
        assert_eq!(env.balance(), 100.0);
    }

    #[test]
    fn test_transaction_cost_not_applied() {
        let config = TradingEnvConfig {
            transaction_cost: 0.5,
            ..small_config()
        };
        let env = quiet_env(&[10.0; 12], config);
        assert_eq!(env.transaction_cost(), 0.5);
        assert_eq!(env.balance(), 90.0);
    }

    #[test]
    fn test_render() {
        let env = quiet_env(&[10.0; 12], small_config());
        assert_eq!(
            env.render(),
            "Step: 10, Balance: 90, Shares held: 1, Total profit: 0"
        );
    }
}
