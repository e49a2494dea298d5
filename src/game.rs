//! # Game Module
//!
//! [`ClassicControlWrapper`] is the per-episode view of an environment used by
//! self-play. It repeats every agent decision for `k` environment steps,
//! folds the rewards of those steps into one discounted reward, and keeps the
//! episode history (observations, actions, rewards, search statistics) needed
//! to build training targets.
//!
//! ## Example
//!
//! ```rust
//! use muzero_classic::env::EnvRegistry;
//! use muzero_classic::game::ClassicControlWrapper;
//!
//! let env = EnvRegistry::classic_control().make("CartPole-v1").unwrap();
//! let mut game = ClassicControlWrapper::new(env, 0.997, 4).unwrap();
//! game.reset();
//! let step = game.step(0).unwrap();
//! assert!(step.inner_steps <= 4);
//! game.store_search_stats(&[3, 1], 0.5).unwrap();
//! let targets = game.make_target(0, 2, 5);
//! assert_eq!(targets.len(), 3);
//! ```

use ndarray::Array1;

use crate::env::Environment;
use crate::error::{Error, Result};

/// Outcome of one agent decision
#[derive(Clone, Debug)]
pub struct GameStep {
    pub observation: Array1<f32>,
    /// Discounted sum of the rewards of the repeated environment steps
    pub reward: f32,
    pub terminated: bool,
    pub truncated: bool,
    /// Environment steps actually taken (fewer than `k` if the episode ended)
    pub inner_steps: usize,
}

impl GameStep {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Training target for one unroll step
#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub value: f32,
    pub reward: f32,
    pub policy: Array1<f32>,
}

/// Wraps one environment for one episode of self-play
pub struct ClassicControlWrapper {
    env: Box<dyn Environment>,
    discount: f32,
    k: usize,
    action_space_size: usize,
    observations: Vec<Array1<f32>>,
    actions: Vec<usize>,
    rewards: Vec<f32>,
    child_visits: Vec<Array1<f32>>,
    root_values: Vec<f32>,
    done: bool,
}

impl ClassicControlWrapper {
    pub fn new(env: Box<dyn Environment>, discount: f32, k: usize) -> Result<Self> {
        if !(discount > 0.0 && discount <= 1.0) {
            return Err(Error::invalid_parameter(
                "discount".to_string(),
                format!("must be in (0, 1], got {}", discount),
            ));
        }
        if k == 0 {
            return Err(Error::invalid_parameter("k", "action repeat must be at least 1"));
        }
        let action_space_size = env.action_space_size();
        Ok(ClassicControlWrapper {
            env,
            discount,
            k,
            action_space_size,
            observations: Vec::new(),
            actions: Vec::new(),
            rewards: Vec::new(),
            child_visits: Vec::new(),
            root_values: Vec::new(),
            done: true,
        })
    }

    pub fn env_id(&self) -> &str {
        self.env.id()
    }

    pub fn discount(&self) -> f32 {
        self.discount
    }

    /// Environment steps per agent decision
    pub fn action_repeat(&self) -> usize {
        self.k
    }

    pub fn action_space_size(&self) -> usize {
        self.action_space_size
    }

    pub fn legal_actions(&self) -> Vec<usize> {
        (0..self.action_space_size).collect()
    }

    /// Clear the history and start a new episode
    pub fn reset(&mut self) -> Array1<f32> {
        self.observations.clear();
        self.actions.clear();
        self.rewards.clear();
        self.child_visits.clear();
        self.root_values.clear();
        self.done = false;

        let observation = self.env.reset();
        self.observations.push(observation.clone());
        observation
    }

    /// Apply `action` for up to `k` environment steps.
    ///
    /// The returned reward is `Σ_j discount^j · r_j` over the steps taken.
    pub fn step(&mut self, action: usize) -> Result<GameStep> {
        if self.done {
            return Err(Error::precondition("game is over or was never reset"));
        }
        if action >= self.action_space_size {
            return Err(Error::InvalidAction {
                action,
                max_actions: self.action_space_size,
            });
        }

        let mut reward = 0.0;
        let mut weight = 1.0;
        let mut inner_steps = 0;
        let mut last = None;
        for _ in 0..self.k {
            let step = self.env.step(action)?;
            reward += weight * step.reward;
            weight *= self.discount;
            inner_steps += 1;
            let done = step.done();
            last = Some(step);
            if done {
                break;
            }
        }
        // k >= 1, so at least one step was taken
        let last = last.ok_or_else(|| Error::precondition("no environment step was taken"))?;

        self.done = last.done();
        self.actions.push(action);
        self.rewards.push(reward);
        self.observations.push(last.observation.clone());

        Ok(GameStep {
            observation: last.observation,
            reward,
            terminated: last.terminated,
            truncated: last.truncated,
            inner_steps,
        })
    }

    pub fn is_terminal(&self) -> bool {
        self.done
    }

    /// Number of decisions taken this episode
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Observation before decision `index` (index `len()` is the latest)
    pub fn observation(&self, index: usize) -> Option<&Array1<f32>> {
        self.observations.get(index)
    }

    pub fn actions(&self) -> &[usize] {
        &self.actions
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    pub fn root_values(&self) -> &[f32] {
        &self.root_values
    }

    pub fn child_visits(&self) -> &[Array1<f32>] {
        &self.child_visits
    }

    /// Record the search result for the current position: root visit counts
    /// (normalised into a policy target) and the root value.
    pub fn store_search_stats(&mut self, visit_counts: &[u32], root_value: f32) -> Result<()> {
        if visit_counts.len() != self.action_space_size {
            return Err(Error::dimension_mismatch(
                format!("{} visit counts", self.action_space_size),
                format!("{} visit counts", visit_counts.len()),
            ));
        }
        let total: u64 = visit_counts.iter().map(|&v| v as u64).sum();
        if total == 0 {
            return Err(Error::invalid_parameter("visit_counts", "at least one visit is required"));
        }
        let policy = visit_counts
            .iter()
            .map(|&v| v as f32 / total as f32)
            .collect::<Array1<f32>>();
        self.child_visits.push(policy);
        self.root_values.push(root_value);
        Ok(())
    }

    /// Targets for `num_unroll_steps + 1` positions starting at `state_index`.
    ///
    /// Value: `root_values[i + td] · γ^td + Σ_{j < td} rewards[i + j] · γ^j`,
    /// dropping the bootstrap term past the last searched position. Positions
    /// past the end are absorbing: zero value, zero reward, all-zero policy.
    pub fn make_target(&self, state_index: usize, num_unroll_steps: usize, td_steps: usize) -> Vec<Target> {
        let searched = self.root_values.len();
        (state_index..=state_index + num_unroll_steps)
            .map(|current| {
                if current >= searched {
                    return Target {
                        value: 0.0,
                        reward: 0.0,
                        policy: Array1::zeros(self.action_space_size),
                    };
                }

                let bootstrap = current + td_steps;
                let mut value = if bootstrap < searched {
                    self.root_values[bootstrap] * self.discount.powi(td_steps as i32)
                } else {
                    0.0
                };
                let end = bootstrap.min(self.rewards.len());
                let mut weight = 1.0;
                for &reward in self.rewards.get(current..end).unwrap_or(&[]) {
                    value += reward * weight;
                    weight *= self.discount;
                }

                Target {
                    value,
                    reward: self.rewards.get(current).copied().unwrap_or(0.0),
                    policy: self.child_visits[current].clone(),
                }
            })
            .collect()
    }
}
