//! # muzero-classic - MuZero Configuration for Classic Control
//!
//! Everything a MuZero trainer needs to know about a classic control task:
//! hyperparameters, the categorical value/reward representation, exploration
//! temperature, and factories for games and freshly initialised networks.
//!
//! ## Key Features
//!
//! - **Categorical supports**: two-hot encoding of scalars over integer bins,
//!   with optional invertible scaling of targets
//! - **Environments**: CartPole, MountainCar and Acrobot with time limits,
//!   behind a registry that accepts custom environments
//! - **Games**: action repeat, discounted reward aggregation and n-step
//!   training targets
//! - **Networks**: representation, dynamics and prediction functions with
//!   uniform initial value and reward predictions
//! - **Episode recording**: selected episodes written as JSON
//!
//! ## Quick Start
//!
//! ```rust
//! use muzero_classic::config::{ClassicControlConfig, TrainingConfig};
//! use muzero_classic::env::VideoConfig;
//!
//! let mut config = ClassicControlConfig::new();
//! config.set_game("CartPole-v1", &VideoConfig::disabled()).unwrap();
//!
//! // Temperature anneals with training progress
//! assert_eq!(config.visit_softmax_temperature_fn(0, 0), 1.0);
//! assert_eq!(config.visit_softmax_temperature_fn(0, 15000), 0.25);
//!
//! let mut game = config.new_game(&VideoConfig::disabled(), Some(0)).unwrap();
//! let observation = game.reset();
//! assert_eq!(observation.len(), 4);
//! ```
//!
//! ## Module Organization
//!
//! - [`activations`] - Activation functions used by the network
//! - [`config`] - Hyperparameters and the game/network factories
//! - [`env`] - Environments, registry and episode recording
//! - [`error`] - Error types and result handling
//! - [`game`] - Per-episode environment wrapper and training targets
//! - [`layers`] - Dense layers and weight initialization
//! - [`loss`] - Cross-entropy over categorical supports
//! - [`network`] - The MuZero network
//! - [`schedule`] - Temperature and learning rate schedules
//! - [`support`] - Discrete supports and scalar transforms

pub mod activations;
pub mod config;
pub mod env;
pub mod error;
pub mod game;
pub mod layers;
pub mod loss;
pub mod network;
pub mod schedule;
pub mod support;

#[cfg(test)]
mod tests;
