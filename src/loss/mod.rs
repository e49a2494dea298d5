//! Losses over categorical value/reward/policy distributions.

pub mod functions;

pub use functions::{
    categorical_cross_entropy, log_softmax_rows, softmax_rows, CategoricalLoss, SoftmaxCrossEntropy,
};
