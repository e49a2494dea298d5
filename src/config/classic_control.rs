use tracing::{debug, info};

use super::{inverse_scalar_transform, BaseConfig, GameSpec, TrainingConfig};
use crate::env::{EnvRegistry, Environment, EpisodeRecorder, VideoConfig};
use crate::error::{Error, Result};
use crate::game::ClassicControlWrapper;
use crate::network::{inverse_transform, MuZeroNet, NetworkSizes};
use crate::schedule::TemperatureSchedule;

/// MuZero configuration for the classic control suite
/// (`CartPole-v1`, `MountainCar-v0`, `Acrobot-v1`, or anything registered
/// in a custom [`EnvRegistry`]).
#[derive(Clone, Debug)]
pub struct ClassicControlConfig {
    base: BaseConfig,
    temperature: TemperatureSchedule,
    registry: EnvRegistry,
    network_sizes: NetworkSizes,
    game: Option<GameSpec>,
}

impl ClassicControlConfig {
    /// Environment steps taken per agent decision
    pub const ACTION_REPEAT: usize = 4;

    pub fn new() -> Self {
        ClassicControlConfig {
            base: BaseConfig::classic_control(),
            temperature: TemperatureSchedule::muzero(),
            registry: EnvRegistry::classic_control(),
            network_sizes: NetworkSizes::default(),
            game: None,
        }
    }

    /// Classic control config with validated custom hyperparameters
    pub fn with_base(base: BaseConfig) -> Result<Self> {
        base.validate()?;
        Ok(ClassicControlConfig {
            base,
            ..Self::new()
        })
    }

    /// Swap the environment registry. Any game set earlier is forgotten.
    pub fn with_registry(mut self, registry: EnvRegistry) -> Self {
        self.registry = registry;
        self.game = None;
        self
    }

    pub fn with_network_sizes(mut self, sizes: NetworkSizes) -> Self {
        self.network_sizes = sizes;
        self
    }

    pub fn with_temperature(mut self, schedule: TemperatureSchedule) -> Self {
        self.temperature = schedule;
        self
    }

    pub fn game(&self) -> Option<&GameSpec> {
        self.game.as_ref()
    }

    pub fn registry(&self) -> &EnvRegistry {
        &self.registry
    }

    pub fn network_sizes(&self) -> NetworkSizes {
        self.network_sizes
    }

    fn game_spec(&self) -> Result<&GameSpec> {
        self.game.as_ref().ok_or(Error::GameNotSet)
    }
}

impl Default for ClassicControlConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl TrainingConfig for ClassicControlConfig {
    type Game = ClassicControlWrapper;
    type Network = MuZeroNet;

    fn base(&self) -> &BaseConfig {
        &self.base
    }

    fn visit_softmax_temperature_fn(&self, _num_moves: usize, trained_steps: usize) -> f32 {
        self.temperature.temperature(trained_steps, self.base.training_steps)
    }

    /// The probe environment is never recorded; `video` is only validated.
    fn set_game(&mut self, env_name: &str, video: &VideoConfig) -> Result<GameSpec> {
        video.validate()?;

        let env = self.registry.make(env_name)?;
        let mut probe = ClassicControlWrapper::new(env, self.base.discount, Self::ACTION_REPEAT)?;
        let observation = probe.reset();

        let spec = GameSpec {
            env_name: env_name.to_string(),
            obs_shape: observation.len(),
            action_space_size: probe.action_space_size(),
        };
        info!(
            "Game set to {}: observation size {}, {} actions",
            spec.env_name, spec.obs_shape, spec.action_space_size
        );
        self.game = Some(spec.clone());
        Ok(spec)
    }

    fn new_game(&self, video: &VideoConfig, uid: Option<u64>) -> Result<ClassicControlWrapper> {
        video.validate()?;
        let spec = self.game_spec()?;

        let mut env = self.registry.make(&spec.env_name)?;
        if let Some(seed) = self.base.seed {
            env.seed(seed.wrapping_add(uid.unwrap_or(0)));
        }

        let env: Box<dyn Environment> = match (&video.destination_path, video.enabled) {
            (Some(destination), true) => {
                let prefix = match uid {
                    Some(uid) => format!("{}-{}", video.name_prefix, uid),
                    None => video.name_prefix.clone(),
                };
                debug!("Recording {} episodes to {} as {}", spec.env_name, destination.display(), prefix);
                Box::new(EpisodeRecorder::new(env, destination, video.predicate(), prefix)?)
            }
            _ => env,
        };

        debug!("New {} game (uid {:?})", spec.env_name, uid);
        ClassicControlWrapper::new(env, self.base.discount, Self::ACTION_REPEAT)
    }

    fn get_uniform_network(&self) -> Result<MuZeroNet> {
        let spec = self.game_spec()?;
        let value_support = self.base.value_support;
        let reward_support = self.base.reward_support;
        let scaling = self.base.scaling;

        let inverse_value =
            inverse_transform(move |logits| inverse_scalar_transform(&value_support, scaling, logits));
        let inverse_reward =
            inverse_transform(move |logits| inverse_scalar_transform(&reward_support, scaling, logits));

        let network = MuZeroNet::new(
            spec.obs_shape,
            spec.action_space_size,
            reward_support.size(),
            value_support.size(),
            inverse_value,
            inverse_reward,
            self.network_sizes,
        )?;
        info!(
            "Built uniform network for {} with {} parameters",
            spec.env_name,
            network.num_parameters()
        );
        Ok(network)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array2};

    #[test]
    fn test_set_game_probes_sizes() {
        let mut config = ClassicControlConfig::new();
        let acrobot = config.set_game("Acrobot-v1", &VideoConfig::disabled()).unwrap();
        assert_eq!((acrobot.obs_shape, acrobot.action_space_size), (6, 3));

        // Re-callable: the second probe overwrites the first.
        let car = config.set_game("MountainCar-v0", &VideoConfig::disabled()).unwrap();
        assert_eq!((car.obs_shape, car.action_space_size), (2, 3));
        assert_eq!(config.game(), Some(&car));
    }

    #[test]
    fn test_set_game_does_not_record_probe() {
        let dir = tempfile::tempdir().unwrap();
        let destination = dir.path().join("videos");
        let mut config = ClassicControlConfig::new();
        let video = VideoConfig::record_to(&destination).with_predicate(|_| true);

        config.set_game("CartPole-v1", &video).unwrap();
        assert!(!destination.exists());

        let invalid = VideoConfig::record_to(&destination).with_name_prefix("");
        assert!(config.set_game("Acrobot-v1", &invalid).is_err());
        assert_eq!(config.game().map(|g| g.env_name.as_str()), Some("CartPole-v1"));
    }

    #[test]
    fn test_unknown_env_leaves_config_unchanged() {
        let mut config = ClassicControlConfig::new();
        config.set_game("CartPole-v1", &VideoConfig::disabled()).unwrap();
        let err = config.set_game("Pendulum-v1", &VideoConfig::disabled()).unwrap_err();
        assert!(matches!(err, Error::UnknownEnvironment { ref id, .. } if id == "Pendulum-v1"));
        assert_eq!(config.game().map(|g| g.env_name.as_str()), Some("CartPole-v1"));
    }

    #[test]
    fn test_factories_need_game() {
        let config = ClassicControlConfig::new();
        assert!(matches!(config.new_game(&VideoConfig::disabled(), None), Err(Error::GameNotSet)));
        assert!(matches!(config.get_uniform_network(), Err(Error::GameNotSet)));
    }

    #[test]
    fn test_new_game_uses_action_repeat_and_discount() {
        let mut config = ClassicControlConfig::new();
        config.set_game("CartPole-v1", &VideoConfig::disabled()).unwrap();
        let game = config.new_game(&VideoConfig::disabled(), Some(3)).unwrap();
        assert_eq!(game.action_repeat(), 4);
        assert_eq!(game.discount(), 0.997);
        assert_eq!(game.env_id(), "CartPole-v1");
    }

    #[test]
    fn test_seeded_games_are_reproducible() {
        let base = BaseConfig {
            seed: Some(42),
            ..BaseConfig::default()
        };
        let mut config = ClassicControlConfig::with_base(base).unwrap();
        config.set_game("CartPole-v1", &VideoConfig::disabled()).unwrap();

        let first = config.new_game(&VideoConfig::disabled(), Some(1)).unwrap().reset();
        let again = config.new_game(&VideoConfig::disabled(), Some(1)).unwrap().reset();
        let other = config.new_game(&VideoConfig::disabled(), Some(2)).unwrap().reset();
        assert_eq!(first, again);
        assert_ne!(first, other);
    }

    #[test]
    fn test_with_base_validates() {
        let base = BaseConfig {
            discount: 0.0,
            ..BaseConfig::default()
        };
        assert!(ClassicControlConfig::with_base(base).is_err());
    }

    #[test]
    fn test_uniform_network_predicts_zero() {
        let mut config = ClassicControlConfig::new().with_network_sizes(NetworkSizes {
            hidden_state_size: 16,
            dynamics_hidden_size: 32,
            prediction_hidden_size: 32,
        });
        config.set_game("CartPole-v1", &VideoConfig::disabled()).unwrap();
        let network = config.get_uniform_network().unwrap();
        assert_eq!(network.value_support_size(), 401);
        assert_eq!(network.reward_support_size(), 201);

        let out = network.initial_inference(array![[0.01, -0.02, 0.03, 0.0]].view()).unwrap();
        assert!(out.value[0].abs() < 1e-3);
        let next = network.recurrent_inference(out.hidden_state.view(), &[1]).unwrap();
        assert!(next.reward[0].abs() < 1e-3);
    }

    #[test]
    fn test_default_network_sizes() {
        let mut config = ClassicControlConfig::new();
        config.set_game("CartPole-v1", &VideoConfig::disabled()).unwrap();
        let network = config.get_uniform_network().unwrap();
        assert_eq!(network.sizes(), NetworkSizes::default());
        let out = network.initial_inference(Array2::zeros((1, 4)).view()).unwrap();
        assert_eq!(out.hidden_state.ncols(), 128);
    }

    #[test]
    fn test_phi_and_inverse_agree() {
        let config = ClassicControlConfig::new();
        let targets = config.value_phi(&[37.0]);
        let logits = targets.mapv(|p| if p > 0.0 { p.ln() } else { -1e4 });
        let value = config.inverse_value_transform(logits.view()).unwrap();
        assert!((value[0] - 37.0).abs() < 0.05);
    }
}
