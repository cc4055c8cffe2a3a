//! Core RL Types
//!
//! Action space shared by the environment and its drivers.

pub mod action;

pub use action::{DiscreteAction, NUM_DISCRETE_ACTIONS};
