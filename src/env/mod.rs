//! # Environment Module
//!
//! Environments are the external backend the MuZero configuration builds games
//! from. Every environment implements [`Environment`]: a discrete action space,
//! a flat `f32` observation vector and gym-style step results that separate
//! *termination* (the task reached a terminal state) from *truncation* (an
//! outside limit such as a step budget ended the episode).
//!
//! ## Contents
//!
//! - [`classic`]: CartPole, MountainCar and Acrobot dynamics
//! - [`TimeLimit`]: step-budget decorator that reports truncation
//! - [`EnvRegistry`]: identifier → factory lookup with typed errors
//! - [`recorder`]: episode recording decorator and its configuration
//!
//! ## Example
//!
//! ```rust
//! use muzero_classic::env::EnvRegistry;
//!
//! let registry = EnvRegistry::classic_control();
//! let mut env = registry.make("CartPole-v1").unwrap();
//! let obs = env.reset();
//! assert_eq!(obs.len(), 4);
//! let step = env.step(1).unwrap();
//! assert_eq!(step.reward, 1.0);
//! ```

pub mod classic;
pub mod recorder;
pub mod registry;

use ndarray::Array1;
use std::collections::HashMap;

use crate::error::{Error, Result};

pub use classic::{Acrobot, CartPole, MountainCar};
pub use recorder::{EpisodePredicate, EpisodeRecorder, VideoConfig};
pub use registry::{EnvFactory, EnvRegistry};

/// Extra diagnostic values attached to a step
pub type Info = HashMap<String, f32>;

/// Result of a single environment step
#[derive(Clone, Debug)]
pub struct Step {
    pub observation: Array1<f32>,
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    pub info: Info,
}

impl Step {
    pub fn new(observation: Array1<f32>, reward: f32, terminated: bool) -> Self {
        Step {
            observation,
            reward,
            terminated,
            truncated: false,
            info: Info::new(),
        }
    }

    /// The episode is over, for either reason
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// A single-agent environment with a discrete action space
pub trait Environment: Send {
    /// Registry identifier, e.g. `CartPole-v1`
    fn id(&self) -> &str;

    /// Start a new episode and return the first observation
    fn reset(&mut self) -> Array1<f32>;

    /// Advance one step. Fails on an out-of-range action or when the
    /// episode has ended and `reset` has not been called.
    fn step(&mut self, action: usize) -> Result<Step>;

    /// Number of discrete actions
    fn action_space_size(&self) -> usize;

    /// Length of the observation vector
    fn observation_size(&self) -> usize;

    /// Reseed the environment's random number generator
    fn seed(&mut self, seed: u64);
}

impl Environment for Box<dyn Environment> {
    fn id(&self) -> &str {
        (**self).id()
    }

    fn reset(&mut self) -> Array1<f32> {
        (**self).reset()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        (**self).step(action)
    }

    fn action_space_size(&self) -> usize {
        (**self).action_space_size()
    }

    fn observation_size(&self) -> usize {
        (**self).observation_size()
    }

    fn seed(&mut self, seed: u64) {
        (**self).seed(seed)
    }
}

/// Ends episodes after a fixed number of steps, reporting them as truncated
pub struct TimeLimit<E> {
    env: E,
    max_episode_steps: usize,
    elapsed_steps: usize,
}

impl<E: Environment> TimeLimit<E> {
    pub fn new(env: E, max_episode_steps: usize) -> Self {
        TimeLimit {
            env,
            max_episode_steps,
            elapsed_steps: 0,
        }
    }

    pub fn max_episode_steps(&self) -> usize {
        self.max_episode_steps
    }

    pub fn inner(&self) -> &E {
        &self.env
    }
}

impl<E: Environment> Environment for TimeLimit<E> {
    fn id(&self) -> &str {
        self.env.id()
    }

    fn reset(&mut self) -> Array1<f32> {
        self.elapsed_steps = 0;
        self.env.reset()
    }

    fn step(&mut self, action: usize) -> Result<Step> {
        let mut step = self.env.step(action)?;
        self.elapsed_steps += 1;
        if self.elapsed_steps >= self.max_episode_steps && !step.terminated {
            step.truncated = true;
        }
        Ok(step)
    }

    fn action_space_size(&self) -> usize {
        self.env.action_space_size()
    }

    fn observation_size(&self) -> usize {
        self.env.observation_size()
    }

    fn seed(&mut self, seed: u64) {
        self.env.seed(seed)
    }
}

/// Shared action check for environment implementations
pub(crate) fn check_action(action: usize, action_space_size: usize) -> Result<()> {
    if action >= action_space_size {
        return Err(Error::InvalidAction {
            action,
            max_actions: action_space_size,
        });
    }
    Ok(())
}

pub(crate) fn episode_finished() -> Error {
    Error::precondition("step called on a finished or unstarted episode; call reset first")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_limit_truncates() {
        let mut env = TimeLimit::new(MountainCar::new(), 3);
        env.reset();
        assert!(!env.step(1).unwrap().truncated);
        assert!(!env.step(1).unwrap().truncated);
        let last = env.step(1).unwrap();
        assert!(last.truncated);
        assert!(last.done());

        env.reset();
        assert!(!env.step(1).unwrap().truncated);
    }

    #[test]
    fn test_boxed_environment_delegates() {
        let mut env: Box<dyn Environment> = Box::new(CartPole::new());
        assert_eq!(env.id(), "CartPole-v1");
        assert_eq!(env.action_space_size(), 2);
        assert_eq!(env.reset().len(), env.observation_size());
    }
}
