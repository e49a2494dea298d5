//! # Configuration Module
//!
//! A MuZero configuration bundles the hyperparameters of a run with the
//! factories that build its games and networks:
//!
//! - [`BaseConfig`]: serialisable hyperparameters shared by all tasks
//! - [`TrainingConfig`]: the operations a trainer needs from a config
//! - [`ClassicControlConfig`]: the configuration for classic control tasks
//!
//! `set_game` must run before games or networks can be built, since it probes
//! the environment for its observation and action sizes.
//!
//! ## Example
//!
//! ```rust
//! use muzero_classic::config::{ClassicControlConfig, TrainingConfig};
//! use muzero_classic::env::VideoConfig;
//!
//! let mut config = ClassicControlConfig::new();
//! let spec = config.set_game("CartPole-v1", &VideoConfig::disabled()).unwrap();
//! assert_eq!((spec.obs_shape, spec.action_space_size), (4, 2));
//!
//! let mut game = config.new_game(&VideoConfig::disabled(), Some(0)).unwrap();
//! game.reset();
//! let network = config.get_uniform_network().unwrap();
//! assert_eq!(network.action_space_size(), 2);
//! ```

pub mod base;
pub mod classic_control;

pub use base::BaseConfig;
pub use classic_control::ClassicControlConfig;

use ndarray::{Array1, Array2, ArrayView2};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::env::VideoConfig;
use crate::error::Result;
use crate::loss::categorical_cross_entropy;
use crate::support::{DiscreteSupport, ScalarScaling};

/// What `set_game` learned about an environment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSpec {
    pub env_name: String,
    /// Length of an observation vector
    pub obs_shape: usize,
    pub action_space_size: usize,
}

/// Operations a MuZero trainer needs from its configuration.
///
/// Implementations are shared read-only between self-play workers once
/// `set_game` has run, so `new_game` and `get_uniform_network` take `&self`.
pub trait TrainingConfig: Send + Sync {
    type Game;
    type Network;

    fn base(&self) -> &BaseConfig;

    /// Softmax temperature for visit counts at `trained_steps`
    fn visit_softmax_temperature_fn(&self, num_moves: usize, trained_steps: usize) -> f32;

    /// Probe `env_name` and remember its observation and action sizes.
    /// Nothing is recorded during the probe, even when `video` enables
    /// recording; the video config is only validated.
    fn set_game(&mut self, env_name: &str, video: &VideoConfig) -> Result<GameSpec>;

    /// Build a fresh game for one self-play episode.
    fn new_game(&self, video: &VideoConfig, uid: Option<u64>) -> Result<Self::Game>;

    /// Build a freshly initialised network whose value and reward heads
    /// predict a uniform distribution.
    fn get_uniform_network(&self) -> Result<Self::Network>;

    /// Cross-entropy between value logits and value targets, per row
    fn scalar_value_loss(&self, prediction: ArrayView2<f32>, target: ArrayView2<f32>) -> Result<Array1<f32>> {
        categorical_cross_entropy(prediction, target)
    }

    /// Cross-entropy between reward logits and reward targets, per row
    fn scalar_reward_loss(&self, prediction: ArrayView2<f32>, target: ArrayView2<f32>) -> Result<Array1<f32>> {
        categorical_cross_entropy(prediction, target)
    }

    fn scalar_transform(&self, x: f32) -> f32 {
        self.base().scaling.apply(x)
    }

    /// Scalar values to categorical targets on the value support
    fn value_phi(&self, values: &[f32]) -> Array2<f32> {
        let base = self.base();
        scalar_to_support(&base.value_support, base.scaling, values)
    }

    /// Scalar rewards to categorical targets on the reward support
    fn reward_phi(&self, rewards: &[f32]) -> Array2<f32> {
        let base = self.base();
        scalar_to_support(&base.reward_support, base.scaling, rewards)
    }

    fn inverse_value_transform(&self, logits: ArrayView2<f32>) -> Result<Array1<f32>> {
        let base = self.base();
        inverse_scalar_transform(&base.value_support, base.scaling, logits)
    }

    fn inverse_reward_transform(&self, logits: ArrayView2<f32>) -> Result<Array1<f32>> {
        let base = self.base();
        inverse_scalar_transform(&base.reward_support, base.scaling, logits)
    }

    fn learning_rate(&self, step: usize) -> f32 {
        self.base().lr_schedule().get_lr(step)
    }

    fn hparams(&self) -> Result<BTreeMap<String, Value>> {
        self.base().hparams()
    }
}

/// Scale each scalar, then two-hot encode it on `support`.
pub fn scalar_to_support(support: &DiscreteSupport, scaling: ScalarScaling, values: &[f32]) -> Array2<f32> {
    let scaled: Vec<f32> = values.iter().map(|&x| scaling.apply(x)).collect();
    support.encode_batch(&scaled)
}

/// Softmax each row of `logits`, decode it on `support`, then undo the scaling.
pub fn inverse_scalar_transform(
    support: &DiscreteSupport,
    scaling: ScalarScaling,
    logits: ArrayView2<f32>,
) -> Result<Array1<f32>> {
    let decoded = support.decode_logits_batch(logits)?;
    Ok(decoded.mapv(|y| scaling.invert(y)))
}
