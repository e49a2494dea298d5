use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::schedule::LearningRateSchedule;
use crate::support::{DiscreteSupport, ScalarScaling};

/// Hyperparameters shared by every MuZero configuration.
///
/// Loaded from and written to JSON. Missing fields fall back to the classic
/// control values, so a file only needs the entries it overrides.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseConfig {
    pub training_steps: usize,
    pub test_interval: usize,
    pub test_episodes: usize,
    pub checkpoint_interval: usize,
    pub max_moves: usize,
    pub discount: f32,

    // Root exploration noise
    pub dirichlet_alpha: f32,
    pub root_exploration_fraction: f32,

    // UCB constants
    pub pb_c_base: f32,
    pub pb_c_init: f32,

    pub num_simulations: usize,
    pub batch_size: usize,
    pub td_steps: usize,
    pub num_unroll_steps: usize,
    pub num_actors: usize,

    pub lr_init: f32,
    pub lr_decay_rate: f32,
    pub lr_decay_steps: usize,
    pub momentum: f32,
    pub weight_decay: f32,
    pub max_grad_norm: f32,

    pub window_size: usize,
    pub value_loss_coeff: f32,

    // Prioritized replay
    pub priority_prob_alpha: f32,
    pub priority_prob_beta: f32,
    pub use_priority: bool,

    pub value_support: DiscreteSupport,
    pub reward_support: DiscreteSupport,
    pub scaling: ScalarScaling,

    pub seed: Option<u64>,
    pub exp_path: Option<PathBuf>,
}

impl BaseConfig {
    /// Hyperparameters for CartPole-like tasks
    pub fn classic_control() -> Self {
        BaseConfig {
            training_steps: 20000,
            test_interval: 100,
            test_episodes: 5,
            checkpoint_interval: 20,
            max_moves: 10000,
            discount: 0.997,
            dirichlet_alpha: 0.25,
            root_exploration_fraction: 0.25,
            pb_c_base: 19652.0,
            pb_c_init: 1.25,
            num_simulations: 50,
            batch_size: 512,
            td_steps: 5,
            num_unroll_steps: 5,
            num_actors: 1,
            lr_init: 0.05,
            lr_decay_rate: 0.01,
            lr_decay_steps: 10000,
            momentum: 0.9,
            weight_decay: 1e-4,
            max_grad_norm: 5.0,
            window_size: 1000,
            value_loss_coeff: 1.0,
            priority_prob_alpha: 1.0,
            priority_prob_beta: 1.0,
            use_priority: true,
            value_support: DiscreteSupport::symmetric(200),
            reward_support: DiscreteSupport::symmetric(100),
            scaling: ScalarScaling::muzero(),
            seed: None,
            exp_path: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.discount > 0.0 && self.discount <= 1.0) {
            return Err(Error::invalid_parameter(
                "discount".to_string(),
                format!("must be in (0, 1], got {}", self.discount),
            ));
        }

        let positive = [
            ("training_steps", self.training_steps),
            ("test_episodes", self.test_episodes),
            ("checkpoint_interval", self.checkpoint_interval),
            ("max_moves", self.max_moves),
            ("num_simulations", self.num_simulations),
            ("batch_size", self.batch_size),
            ("td_steps", self.td_steps),
            ("num_unroll_steps", self.num_unroll_steps),
            ("num_actors", self.num_actors),
            ("lr_decay_steps", self.lr_decay_steps),
            ("window_size", self.window_size),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(Error::invalid_parameter(name, "must be positive"));
            }
        }

        for (name, value) in [
            ("lr_init", self.lr_init),
            ("lr_decay_rate", self.lr_decay_rate),
            ("value_loss_coeff", self.value_loss_coeff),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(Error::invalid_parameter(name.to_string(), format!("must be positive, got {}", value)));
            }
        }

        if !(0.0..=1.0).contains(&self.root_exploration_fraction) {
            return Err(Error::invalid_parameter(
                "root_exploration_fraction".to_string(),
                format!("must be in [0, 1], got {}", self.root_exploration_fraction),
            ));
        }

        if let ScalarScaling::Invertible { epsilon } = self.scaling {
            if !(epsilon > 0.0) {
                return Err(Error::invalid_parameter(
                    "scaling.epsilon".to_string(),
                    format!("must be positive, got {}", epsilon),
                ));
            }
        }
        Ok(())
    }

    /// Exponential learning rate decay from `lr_init`
    pub fn lr_schedule(&self) -> LearningRateSchedule {
        LearningRateSchedule::exponential_decay(self.lr_init, self.lr_decay_rate, self.lr_decay_steps)
    }

    /// Read a config from a JSON file and validate it.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let reader = BufReader::new(fs::File::open(path)?);
        let config: BaseConfig = serde_json::from_reader(reader)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let writer = BufWriter::new(fs::File::create(path)?);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Flat `name -> value` view for experiment logging. Nested values
    /// (supports, scaling) are flattened with dotted keys.
    pub fn hparams(&self) -> Result<BTreeMap<String, Value>> {
        let mut flat = BTreeMap::new();
        flatten_into(&mut flat, String::new(), serde_json::to_value(self)?);
        Ok(flat)
    }
}

impl Default for BaseConfig {
    fn default() -> Self {
        Self::classic_control()
    }
}

fn flatten_into(flat: &mut BTreeMap<String, Value>, prefix: String, value: Value) {
    match value {
        Value::Object(map) => {
            for (key, inner) in map {
                let name = if prefix.is_empty() {
                    key
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(flat, name, inner);
            }
        }
        other => {
            flat.insert(prefix, other);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classic_defaults_are_valid() {
        let config = BaseConfig::classic_control();
        config.validate().unwrap();
        assert_eq!(config.value_support.size(), 401);
        assert_eq!(config.reward_support.size(), 201);
    }

    #[test]
    fn test_validate_rejects_bad_discount() {
        for discount in [0.0, -0.5, 1.5, f32::NAN] {
            let config = BaseConfig {
                discount,
                ..BaseConfig::default()
            };
            assert!(config.validate().is_err(), "discount {} accepted", discount);
        }
        let config = BaseConfig {
            discount: 1.0,
            ..BaseConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_batch() {
        let config = BaseConfig {
            batch_size: 0,
            ..BaseConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidParameter { name, .. }) if name == "batch_size"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: BaseConfig = serde_json::from_str(r#"{"batch_size": 64, "seed": 7}"#).unwrap();
        assert_eq!(config.batch_size, 64);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.training_steps, 20000);
    }

    #[test]
    fn test_json_rejects_inverted_support() {
        let result: std::result::Result<BaseConfig, _> =
            serde_json::from_str(r#"{"value_support": {"min": 5, "max": -5}}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_hparams_flattened() {
        let hparams = BaseConfig::default().hparams().unwrap();
        assert_eq!(hparams["batch_size"], Value::from(512));
        assert_eq!(hparams["value_support.min"], Value::from(-200));
        assert_eq!(hparams["reward_support.max"], Value::from(100));
        assert_eq!(hparams["seed"], Value::Null);
    }

    #[test]
    fn test_learning_rate_decay() {
        let schedule = BaseConfig::default().lr_schedule();
        assert!((schedule.get_lr(0) - 0.05).abs() < 1e-7);
        assert!((schedule.get_lr(10000) - 0.0005).abs() < 1e-7);
    }
}
