//! # MuZero Network
//!
//! A small fully connected MuZero network for vector observations, made of
//! three learned functions:
//!
//! - **representation** `h`: observation → hidden state
//! - **dynamics** `g`: (hidden state, one-hot action) → (next hidden state, reward logits)
//! - **prediction** `f`: hidden state → (policy logits, value logits)
//!
//! Value and reward heads output logits over a categorical support. The
//! network carries the inverse transforms handed to it at construction, so
//! both inference calls also return decoded scalar values and rewards.
//!
//! The last layer of the value and reward heads starts at zero, so a freshly
//! built network predicts a uniform distribution for both.
//!
//! ## Example
//!
//! ```rust
//! use muzero_classic::network::{inverse_transform, MuZeroNet, NetworkSizes};
//! use muzero_classic::support::DiscreteSupport;
//! use ndarray::Array2;
//!
//! let value = DiscreteSupport::new(-10, 10).unwrap();
//! let reward = DiscreteSupport::new(-5, 5).unwrap();
//! let net = MuZeroNet::new(
//!     4, 2, reward.size(), value.size(),
//!     inverse_transform(move |logits| value.decode_logits_batch(logits)),
//!     inverse_transform(move |logits| reward.decode_logits_batch(logits)),
//!     NetworkSizes::default(),
//! ).unwrap();
//! let out = net.initial_inference(Array2::zeros((1, 4)).view()).unwrap();
//! assert_eq!(out.policy_logits.dim(), (1, 2));
//! let next = net.recurrent_inference(out.hidden_state.view(), &[1]).unwrap();
//! assert_eq!(next.reward.len(), 1);
//! ```

use bincode::{deserialize, serialize};
use ndarray::{concatenate, Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use crate::activations::Activation;
use crate::error::{Error, Result};
use crate::layers::{forward_sequential, DenseLayer};

/// Decodes a `(batch, bins)` matrix of logits into one scalar per row
pub type InverseTransform = Arc<dyn Fn(ArrayView2<f32>) -> Result<Array1<f32>> + Send + Sync>;

/// Wrap a decoding closure as an [`InverseTransform`]
pub fn inverse_transform<F>(f: F) -> InverseTransform
where
    F: Fn(ArrayView2<f32>) -> Result<Array1<f32>> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Hidden layer widths
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkSizes {
    pub hidden_state_size: usize,
    pub dynamics_hidden_size: usize,
    pub prediction_hidden_size: usize,
}

impl Default for NetworkSizes {
    fn default() -> Self {
        NetworkSizes {
            hidden_state_size: 128,
            dynamics_hidden_size: 256,
            prediction_hidden_size: 256,
        }
    }
}

/// All trainable parameters, grouped by function
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NetworkWeights {
    pub representation: Vec<DenseLayer>,
    pub dynamics_state: Vec<DenseLayer>,
    pub dynamics_reward: Vec<DenseLayer>,
    pub prediction_policy: Vec<DenseLayer>,
    pub prediction_value: Vec<DenseLayer>,
}

impl NetworkWeights {
    fn groups(&self) -> [(&'static str, &Vec<DenseLayer>); 5] {
        [
            ("representation", &self.representation),
            ("dynamics_state", &self.dynamics_state),
            ("dynamics_reward", &self.dynamics_reward),
            ("prediction_policy", &self.prediction_policy),
            ("prediction_value", &self.prediction_value),
        ]
    }

    pub fn num_parameters(&self) -> usize {
        self.groups()
            .iter()
            .flat_map(|(_, layers)| layers.iter())
            .map(DenseLayer::num_parameters)
            .sum()
    }

    fn check_same_shapes(&self, other: &NetworkWeights) -> Result<()> {
        for ((name, ours), (_, theirs)) in self.groups().iter().zip(other.groups().iter()) {
            let shapes = |layers: &Vec<DenseLayer>| {
                layers
                    .iter()
                    .map(|l| (l.weights.dim(), l.biases.len()))
                    .collect::<Vec<_>>()
            };
            if shapes(ours) != shapes(theirs) {
                return Err(Error::dimension_mismatch(
                    format!("{} layers {:?}", name, shapes(ours)),
                    format!("{:?}", shapes(theirs)),
                ));
            }
        }
        Ok(())
    }
}

/// Output of an inference call, one row per batch item
#[derive(Clone, Debug)]
pub struct NetworkOutput {
    /// Decoded scalar value
    pub value: Array1<f32>,
    /// Decoded scalar reward (zero for initial inference)
    pub reward: Array1<f32>,
    pub policy_logits: Array2<f32>,
    pub value_logits: Array2<f32>,
    /// Reward logits (absent for initial inference)
    pub reward_logits: Option<Array2<f32>>,
    pub hidden_state: Array2<f32>,
}

#[derive(Serialize, Deserialize)]
struct SavedNetwork {
    obs_size: usize,
    action_space_size: usize,
    reward_support_size: usize,
    value_support_size: usize,
    sizes: NetworkSizes,
    weights: NetworkWeights,
}

/// MuZero network for flat observations and discrete actions
#[derive(Clone)]
pub struct MuZeroNet {
    obs_size: usize,
    action_space_size: usize,
    reward_support_size: usize,
    value_support_size: usize,
    sizes: NetworkSizes,
    weights: NetworkWeights,
    inverse_value_transform: InverseTransform,
    inverse_reward_transform: InverseTransform,
}

impl MuZeroNet {
    pub fn new(
        obs_size: usize,
        action_space_size: usize,
        reward_support_size: usize,
        value_support_size: usize,
        inverse_value_transform: InverseTransform,
        inverse_reward_transform: InverseTransform,
        sizes: NetworkSizes,
    ) -> Result<Self> {
        for (name, value) in [
            ("obs_size", obs_size),
            ("action_space_size", action_space_size),
            ("reward_support_size", reward_support_size),
            ("value_support_size", value_support_size),
            ("hidden_state_size", sizes.hidden_state_size),
            ("dynamics_hidden_size", sizes.dynamics_hidden_size),
            ("prediction_hidden_size", sizes.prediction_hidden_size),
        ] {
            if value == 0 {
                return Err(Error::invalid_parameter(name, "must be positive"));
            }
        }

        let hidden = sizes.hidden_state_size;
        let dynamics_in = hidden + action_space_size;
        let leaky = Activation::leaky_relu();

        let weights = NetworkWeights {
            representation: vec![DenseLayer::new(obs_size, hidden, Activation::Tanh)],
            dynamics_state: vec![
                DenseLayer::new(dynamics_in, sizes.dynamics_hidden_size, Activation::Tanh),
                DenseLayer::new(sizes.dynamics_hidden_size, hidden, Activation::Tanh),
            ],
            dynamics_reward: vec![
                DenseLayer::new(dynamics_in, sizes.dynamics_hidden_size, leaky),
                DenseLayer::new(sizes.dynamics_hidden_size, reward_support_size, Activation::Linear).zeroed(),
            ],
            prediction_policy: vec![
                DenseLayer::new(hidden, sizes.prediction_hidden_size, leaky),
                DenseLayer::new(sizes.prediction_hidden_size, action_space_size, Activation::Linear),
            ],
            prediction_value: vec![
                DenseLayer::new(hidden, sizes.prediction_hidden_size, leaky),
                DenseLayer::new(sizes.prediction_hidden_size, value_support_size, Activation::Linear).zeroed(),
            ],
        };

        Ok(MuZeroNet {
            obs_size,
            action_space_size,
            reward_support_size,
            value_support_size,
            sizes,
            weights,
            inverse_value_transform,
            inverse_reward_transform,
        })
    }

    pub fn obs_size(&self) -> usize {
        self.obs_size
    }

    pub fn action_space_size(&self) -> usize {
        self.action_space_size
    }

    pub fn reward_support_size(&self) -> usize {
        self.reward_support_size
    }

    pub fn value_support_size(&self) -> usize {
        self.value_support_size
    }

    pub fn sizes(&self) -> NetworkSizes {
        self.sizes
    }

    pub fn num_parameters(&self) -> usize {
        self.weights.num_parameters()
    }

    /// Observation → hidden state
    pub fn representation(&self, observations: ArrayView2<f32>) -> Result<Array2<f32>> {
        if observations.ncols() != self.obs_size {
            return Err(Error::dimension_mismatch(
                format!("{} observation features", self.obs_size),
                format!("{} observation features", observations.ncols()),
            ));
        }
        forward_sequential(&self.weights.representation, observations)
    }

    /// (hidden state, action) → (next hidden state, reward logits)
    pub fn dynamics(&self, hidden_state: ArrayView2<f32>, actions: &[usize]) -> Result<(Array2<f32>, Array2<f32>)> {
        if hidden_state.ncols() != self.sizes.hidden_state_size {
            return Err(Error::dimension_mismatch(
                format!("hidden state of width {}", self.sizes.hidden_state_size),
                format!("hidden state of width {}", hidden_state.ncols()),
            ));
        }
        if hidden_state.nrows() != actions.len() {
            return Err(Error::dimension_mismatch(
                format!("{} actions", hidden_state.nrows()),
                format!("{} actions", actions.len()),
            ));
        }

        let mut one_hot = Array2::<f32>::zeros((actions.len(), self.action_space_size));
        for (row, &action) in actions.iter().enumerate() {
            if action >= self.action_space_size {
                return Err(Error::InvalidAction {
                    action,
                    max_actions: self.action_space_size,
                });
            }
            one_hot[[row, action]] = 1.0;
        }

        let input = concatenate(Axis(1), &[hidden_state.view(), one_hot.view()])
            .map_err(|e| Error::dimension_mismatch("concatenable hidden state and actions".to_string(), e.to_string()))?;
        let next_state = forward_sequential(&self.weights.dynamics_state, input.view())?;
        let reward_logits = forward_sequential(&self.weights.dynamics_reward, input.view())?;
        Ok((next_state, reward_logits))
    }

    /// hidden state → (policy logits, value logits)
    pub fn prediction(&self, hidden_state: ArrayView2<f32>) -> Result<(Array2<f32>, Array2<f32>)> {
        let policy_logits = forward_sequential(&self.weights.prediction_policy, hidden_state)?;
        let value_logits = forward_sequential(&self.weights.prediction_value, hidden_state)?;
        Ok((policy_logits, value_logits))
    }

    /// Representation followed by prediction
    pub fn initial_inference(&self, observations: ArrayView2<f32>) -> Result<NetworkOutput> {
        let hidden_state = self.representation(observations)?;
        let (policy_logits, value_logits) = self.prediction(hidden_state.view())?;
        let value = (self.inverse_value_transform)(value_logits.view())?;
        Ok(NetworkOutput {
            value,
            reward: Array1::zeros(observations.nrows()),
            policy_logits,
            value_logits,
            reward_logits: None,
            hidden_state,
        })
    }

    /// Dynamics followed by prediction
    pub fn recurrent_inference(&self, hidden_state: ArrayView2<f32>, actions: &[usize]) -> Result<NetworkOutput> {
        let (next_state, reward_logits) = self.dynamics(hidden_state, actions)?;
        let (policy_logits, value_logits) = self.prediction(next_state.view())?;
        let value = (self.inverse_value_transform)(value_logits.view())?;
        let reward = (self.inverse_reward_transform)(reward_logits.view())?;
        Ok(NetworkOutput {
            value,
            reward,
            policy_logits,
            value_logits,
            reward_logits: Some(reward_logits),
            hidden_state: next_state,
        })
    }

    pub fn weights(&self) -> &NetworkWeights {
        &self.weights
    }

    pub fn weights_mut(&mut self) -> &mut NetworkWeights {
        &mut self.weights
    }

    /// Replace all parameters; shapes must match this network's layout.
    pub fn set_weights(&mut self, weights: NetworkWeights) -> Result<()> {
        self.weights.check_same_shapes(&weights)?;
        self.weights = weights;
        Ok(())
    }

    /// Save the layout and parameters to a file with bincode.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let saved = SavedNetwork {
            obs_size: self.obs_size,
            action_space_size: self.action_space_size,
            reward_support_size: self.reward_support_size,
            value_support_size: self.value_support_size,
            sizes: self.sizes,
            weights: self.weights.clone(),
        };
        let serialized = serialize(&saved)?;
        let mut file = fs::File::create(path)?;
        file.write_all(&serialized)?;
        Ok(())
    }

    /// Load parameters saved by [`MuZeroNet::save`] into this network.
    /// The saved layout must match.
    pub fn load_weights(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = fs::File::open(path)?;
        let mut buffer = Vec::new();
        file.read_to_end(&mut buffer)?;
        let saved: SavedNetwork = deserialize(&buffer)?;

        let ours = (self.obs_size, self.action_space_size, self.reward_support_size, self.value_support_size);
        let theirs = (saved.obs_size, saved.action_space_size, saved.reward_support_size, saved.value_support_size);
        if ours != theirs || self.sizes != saved.sizes {
            return Err(Error::dimension_mismatch(
                format!("layout {:?} {:?}", ours, self.sizes),
                format!("layout {:?} {:?}", theirs, saved.sizes),
            ));
        }
        self.set_weights(saved.weights)
    }
}

impl fmt::Debug for MuZeroNet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MuZeroNet")
            .field("obs_size", &self.obs_size)
            .field("action_space_size", &self.action_space_size)
            .field("reward_support_size", &self.reward_support_size)
            .field("value_support_size", &self.value_support_size)
            .field("sizes", &self.sizes)
            .field("num_parameters", &self.num_parameters())
            .finish()
    }
}
