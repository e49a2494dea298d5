use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::{Acrobot, CartPole, Environment, MountainCar, TimeLimit};
use crate::error::{Error, Result};

/// Builds a fresh environment instance
pub type EnvFactory = Arc<dyn Fn() -> Box<dyn Environment> + Send + Sync>;

/// Maps environment identifiers to factories.
///
/// Factories are probed once when registered, so a registry never holds an
/// entry that builds an environment with an empty action or observation space.
#[derive(Clone, Default)]
pub struct EnvRegistry {
    factories: BTreeMap<String, EnvFactory>,
}

impl EnvRegistry {
    /// An empty registry
    pub fn new() -> Self {
        EnvRegistry {
            factories: BTreeMap::new(),
        }
    }

    /// Registry holding `CartPole-v1`, `MountainCar-v0` and `Acrobot-v1`
    /// with their standard episode step limits.
    pub fn classic_control() -> Self {
        let mut registry = EnvRegistry::new();
        let builtin: [(&str, EnvFactory); 3] = [
            ("CartPole-v1", time_limited(CartPole::new, 500)),
            ("MountainCar-v0", time_limited(MountainCar::new, 200)),
            ("Acrobot-v1", time_limited(Acrobot::new, 500)),
        ];
        for (id, factory) in builtin {
            registry.factories.insert(id.to_string(), factory);
        }
        registry
    }

    /// Register a factory under `id`.
    ///
    /// Fails if the id is blank or already taken, or if the factory builds an
    /// environment without actions or observations.
    pub fn register<F>(&mut self, id: impl Into<String>, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn Environment> + Send + Sync + 'static,
    {
        let id = id.into();
        if id.trim().is_empty() || id.trim() != id {
            return Err(Error::invalid_parameter(
                "env_id".to_string(),
                format!("'{}' must be non-empty without surrounding whitespace", id),
            ));
        }
        if self.factories.contains_key(&id) {
            return Err(Error::invalid_parameter(
                "env_id".to_string(),
                format!("'{}' is already registered", id),
            ));
        }

        let probe = factory();
        if probe.action_space_size() == 0 || probe.observation_size() == 0 {
            return Err(Error::invalid_parameter(
                "env_factory".to_string(),
                format!(
                    "'{}' builds an environment with {} actions and {} observation dims",
                    id,
                    probe.action_space_size(),
                    probe.observation_size()
                ),
            ));
        }

        self.factories.insert(id, Arc::new(factory));
        Ok(())
    }

    /// Build a fresh environment for `id`
    pub fn make(&self, id: &str) -> Result<Box<dyn Environment>> {
        match self.factories.get(id) {
            Some(factory) => Ok(factory()),
            None => Err(Error::UnknownEnvironment {
                id: id.to_string(),
                known: self.ids().collect::<Vec<_>>().join(", "),
            }),
        }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.factories.contains_key(id)
    }

    /// Registered identifiers in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}

fn time_limited<E: Environment + 'static>(build: fn() -> E, max_episode_steps: usize) -> EnvFactory {
    Arc::new(move || Box::new(TimeLimit::new(build(), max_episode_steps)) as Box<dyn Environment>)
}

impl fmt::Debug for EnvRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvRegistry")
            .field("ids", &self.ids().collect::<Vec<_>>())
            .finish()
    }
}
