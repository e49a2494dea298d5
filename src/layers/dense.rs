use ndarray::{Array1, Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

use super::initialization::WeightInit;
use crate::activations::Activation;
use crate::error::{Error, Result};

/// A fully connected (dense) layer: `activation(inputs · W + b)`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct DenseLayer {
    pub weights: Array2<f32>,
    pub biases: Array1<f32>,
    pub activation: Activation,
}

impl DenseLayer {
    /// Create a new dense layer with fan-in uniform initialization.
    pub fn new(input_size: usize, output_size: usize, activation: Activation) -> Self {
        Self::new_with_init(input_size, output_size, activation, WeightInit::default())
    }

    pub fn new_with_init(input_size: usize, output_size: usize, activation: Activation, init: WeightInit) -> Self {
        DenseLayer {
            weights: init.initialize_weights((input_size, output_size)),
            biases: init.initialize_biases(input_size, output_size),
            activation,
        }
    }

    /// Forward pass for a batch of input rows.
    pub fn forward_batch(&self, inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
        if inputs.ncols() != self.input_size() {
            return Err(Error::dimension_mismatch(
                format!("{} input features", self.input_size()),
                format!("{} input features", inputs.ncols()),
            ));
        }
        let mut outputs = inputs.dot(&self.weights) + &self.biases.view().insert_axis(Axis(0));
        self.activation.apply_batch(&mut outputs);
        Ok(outputs)
    }

    pub fn output_size(&self) -> usize {
        self.weights.shape()[1]
    }

    pub fn input_size(&self) -> usize {
        self.weights.shape()[0]
    }

    pub fn num_parameters(&self) -> usize {
        self.weights.len() + self.biases.len()
    }

    /// Zero the weights and biases
    pub fn zeroed(mut self) -> Self {
        self.weights.fill(0.0);
        self.biases.fill(0.0);
        self
    }
}

/// Run `inputs` through `layers` in order
pub fn forward_sequential(layers: &[DenseLayer], inputs: ArrayView2<f32>) -> Result<Array2<f32>> {
    let mut current = inputs.to_owned();
    for layer in layers {
        current = layer.forward_batch(current.view())?;
    }
    Ok(current)
}
