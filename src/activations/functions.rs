use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// An enumeration of the activation functions used by the network heads.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum Activation {
    #[default]
    Relu,
    Linear,
    Tanh,
    LeakyRelu { alpha: f32 },
}

impl Activation {
    /// LeakyReLU with the conventional 0.01 negative slope
    pub fn leaky_relu() -> Self {
        Activation::LeakyRelu { alpha: 0.01 }
    }

    /// Apply the activation function to an input array in-place.
    pub fn apply(&self, input: &mut Array1<f32>) {
        input.mapv_inplace(|v| self.scalar(v));
    }

    /// Apply the activation function to a batch of input arrays in-place.
    pub fn apply_batch(&self, inputs: &mut Array2<f32>) {
        match self {
            Activation::Linear => {}
            _ => inputs.mapv_inplace(|v| self.scalar(v)),
        }
    }

    #[inline]
    fn scalar(&self, v: f32) -> f32 {
        match *self {
            Activation::Relu => v.max(0.0),
            Activation::Linear => v,
            Activation::Tanh => v.tanh(),
            Activation::LeakyRelu { alpha } => {
                if v > 0.0 {
                    v
                } else {
                    alpha * v
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_activations() {
        let mut x = array![-2.0, 0.0, 3.0];
        Activation::Relu.apply(&mut x);
        assert_eq!(x, array![0.0, 0.0, 3.0]);

        let mut x = array![-2.0, 0.0, 3.0];
        Activation::leaky_relu().apply(&mut x);
        assert_eq!(x, array![-0.02, 0.0, 3.0]);

        let mut x = array![[-100.0, 100.0]];
        Activation::Tanh.apply_batch(&mut x);
        assert!((x[[0, 0]] + 1.0).abs() < 1e-6 && (x[[0, 1]] - 1.0).abs() < 1e-6);

        let mut x = array![[-1.5, 2.5]];
        Activation::Linear.apply_batch(&mut x);
        assert_eq!(x, array![[-1.5, 2.5]]);
    }
}
