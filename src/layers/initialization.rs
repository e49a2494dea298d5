use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::Uniform;
use ndarray_rand::RandomExt;
use serde::{Deserialize, Serialize};

/// Weight initialization strategies
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub enum WeightInit {
    /// Uniform in `±1/sqrt(fan_in)` for weights and biases (the usual
    /// default for linear layers)
    #[default]
    FanInUniform,

    /// Xavier/Glorot uniform initialization, zero biases
    XavierUniform,

    /// All zeros
    Zeros,
}

impl WeightInit {
    /// Initialize weights for a layer of shape `(fan_in, fan_out)`
    pub fn initialize_weights(&self, shape: (usize, usize)) -> Array2<f32> {
        let (fan_in, fan_out) = shape;

        match self {
            WeightInit::FanInUniform => {
                let bound = 1.0 / (fan_in.max(1) as f32).sqrt();
                Array2::random(shape, Uniform::new_inclusive(-bound, bound))
            }

            WeightInit::XavierUniform => {
                let limit = (6.0 / (fan_in + fan_out).max(1) as f32).sqrt();
                Array2::random(shape, Uniform::new_inclusive(-limit, limit))
            }

            WeightInit::Zeros => Array2::zeros(shape),
        }
    }

    /// Initialize biases for a layer
    pub fn initialize_biases(&self, fan_in: usize, size: usize) -> Array1<f32> {
        match self {
            WeightInit::FanInUniform => {
                let bound = 1.0 / (fan_in.max(1) as f32).sqrt();
                Array1::random(size, Uniform::new_inclusive(-bound, bound))
            }

            WeightInit::XavierUniform | WeightInit::Zeros => Array1::zeros(size),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fan_in_bounds() {
        let weights = WeightInit::FanInUniform.initialize_weights((16, 8));
        let biases = WeightInit::FanInUniform.initialize_biases(16, 8);
        assert!(weights.iter().all(|w| w.abs() <= 0.25));
        assert!(biases.iter().all(|b| b.abs() <= 0.25));
    }

    #[test]
    fn test_zeros() {
        assert!(WeightInit::Zeros.initialize_weights((3, 4)).iter().all(|&w| w == 0.0));
        assert!(WeightInit::Zeros.initialize_biases(3, 4).iter().all(|&b| b == 0.0));
    }

    #[test]
    fn test_xavier_bounds() {
        // sqrt(6 / (10 + 14)) = 0.5
        let weights = WeightInit::XavierUniform.initialize_weights((10, 14));
        assert!(weights.iter().all(|w| w.abs() <= 0.5));
        assert!(WeightInit::XavierUniform.initialize_biases(10, 14).iter().all(|&b| b == 0.0));
    }
}
