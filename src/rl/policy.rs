//! Policies
//!
//! Anything that picks an action from an observation. Drivers receive the
//! policy as an argument; there is no process-wide model.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::rl::core::{DiscreteAction, NUM_DISCRETE_ACTIONS};

/// Decision-maker driven by the evaluation loop
pub trait Policy {
    /// Called before every episode
    fn on_episode_start(&mut self) {}

    /// Choose the next action
    fn act(&mut self, observation: &[f32]) -> DiscreteAction;

    /// Receive the outcome of the last action. Learning policies update
    /// here; the default ignores it.
    fn observe(&mut self, _observation: &[f32], _reward: f64, _done: bool) {}
}

/// Always holds
#[derive(Debug, Clone, Copy, Default)]
pub struct HoldPolicy;

impl Policy for HoldPolicy {
    fn act(&mut self, _observation: &[f32]) -> DiscreteAction {
        DiscreteAction::Hold
    }
}

/// Plays a fixed list of actions, then holds
#[derive(Debug, Clone, Default)]
pub struct ScriptedPolicy {
    actions: Vec<DiscreteAction>,
    cursor: usize,
}

impl ScriptedPolicy {
    pub fn new(actions: Vec<DiscreteAction>) -> Self {
        Self { actions, cursor: 0 }
    }

    /// Start the script over
    pub fn rewind(&mut self) {
        self.cursor = 0;
    }
}

impl Policy for ScriptedPolicy {
    fn on_episode_start(&mut self) {
        self.rewind();
    }

    fn act(&mut self, _observation: &[f32]) -> DiscreteAction {
        let action = self
            .actions
            .get(self.cursor)
            .copied()
            .unwrap_or(DiscreteAction::Hold);
        self.cursor += 1;
        action
    }
}

/// Uniformly random actions from a seeded generator
#[derive(Debug, Clone)]
pub struct RandomPolicy {
    rng: StdRng,
}

impl RandomPolicy {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Policy for RandomPolicy {
    fn act(&mut self, _observation: &[f32]) -> DiscreteAction {
        let index = self.rng.gen_range(0..NUM_DISCRETE_ACTIONS);
        DiscreteAction::from_index(index).unwrap_or_default()
    }
}
