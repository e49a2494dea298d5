//! # Activation Functions Module
//!
//! Element-wise non-linearities used between the dense layers of the
//! representation, dynamics and prediction functions.
//!
//! - **Tanh**: bounds hidden states to `[-1, 1]`
//! - **LeakyReLU**: hidden layers of the reward, policy and value heads
//! - **Linear**: output logits
//! - **ReLU**: available for custom network layouts

pub mod functions;

pub use functions::Activation;
