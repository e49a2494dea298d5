//! # Categorical Support Module
//!
//! MuZero predicts values and rewards as categorical distributions over a fixed
//! set of integer bins rather than as raw scalars. This module holds the bin
//! range ([`DiscreteSupport`]) and the transforms between a scalar and its
//! distribution:
//!
//! - **Encode** ("two-hot"): a scalar is clamped into `[min, max]` and split
//!   between its two neighbouring integer bins by linear interpolation.
//! - **Decode**: the expectation `Σ p_i · (min + i)` of a distribution.
//!
//! Encoding an integer inside the range and decoding it gives the same integer
//! back exactly. Values outside the range are clamped to the boundary bin.
//!
//! ## Example
//!
//! ```rust
//! use muzero_classic::support::DiscreteSupport;
//!
//! let support = DiscreteSupport::new(-5, 5).unwrap();
//! let dist = support.encode(2.25);
//! assert_eq!(dist.len(), 11);
//! assert!((support.decode(dist.view()).unwrap() - 2.25).abs() < 1e-6);
//! ```
//!
//! [`ScalarScaling`] adds the optional invertible compression `h(x)` applied to
//! targets before encoding, so large returns fit into a modest support.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Zip};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::error::{Error, Result};
use crate::loss::softmax_rows;

/// Integer range `[min, max]` whose bins carry a categorical distribution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSupport")]
pub struct DiscreteSupport {
    min: i32,
    max: i32,
}

#[derive(Deserialize)]
struct RawSupport {
    min: i32,
    max: i32,
}

impl TryFrom<RawSupport> for DiscreteSupport {
    type Error = Error;

    fn try_from(raw: RawSupport) -> Result<Self> {
        DiscreteSupport::new(raw.min, raw.max)
    }
}

impl DiscreteSupport {
    /// Create a support over `[min, max]`. Fails when `max < min`.
    pub fn new(min: i32, max: i32) -> Result<Self> {
        if max < min {
            return Err(Error::invalid_parameter(
                "support".to_string(),
                format!("max ({}) must not be smaller than min ({})", max, min),
            ));
        }
        Ok(DiscreteSupport { min, max })
    }

    /// Support over `[-bound, bound]`
    pub const fn symmetric(bound: u16) -> Self {
        DiscreteSupport {
            min: -(bound as i32),
            max: bound as i32,
        }
    }

    pub fn min(&self) -> i32 {
        self.min
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Number of bins, `max - min + 1`.
    pub fn size(&self) -> usize {
        (self.max as i64 - self.min as i64 + 1) as usize
    }

    /// The bin values `min..=max`.
    pub fn range(&self) -> RangeInclusive<i32> {
        self.min..=self.max
    }

    /// Bin values as floats, in bin order.
    pub fn bins(&self) -> Array1<f32> {
        self.range().map(|v| v as f32).collect()
    }

    /// Two-hot encode a scalar. Out-of-range values are clamped to the
    /// boundary bin; NaN is treated as zero.
    pub fn encode(&self, value: f32) -> Array1<f32> {
        let mut out = Array1::zeros(self.size());
        self.encode_into(value, out.view_mut());
        out
    }

    /// Encode a batch of scalars into a `(batch, size)` matrix.
    /// Rows are encoded in parallel.
    pub fn encode_batch(&self, values: &[f32]) -> Array2<f32> {
        let mut out = Array2::zeros((values.len(), self.size()));
        Zip::from(out.rows_mut())
            .and(&ArrayView1::from(values))
            .par_for_each(|row, &value| self.encode_into(value, row));
        out
    }

    fn encode_into(&self, value: f32, mut out: ndarray::ArrayViewMut1<f32>) {
        // f64 holds every offset of an i32 support exactly; f32 stops at 2^24.
        let value = if value.is_nan() { 0.0 } else { f64::from(value) };
        let (min, max) = (f64::from(self.min), f64::from(self.max));
        let shifted = value.clamp(min, max) - min;
        let low = shifted.floor();
        let low_idx = (low as usize).min(out.len() - 1);
        let p_high = (shifted - low) as f32;

        out[low_idx] += 1.0 - p_high;
        if p_high > 0.0 && low_idx + 1 < out.len() {
            out[low_idx + 1] += p_high;
        }
    }

    /// Expected bin value of a probability vector.
    pub fn decode(&self, probs: ArrayView1<f32>) -> Result<f32> {
        if probs.len() != self.size() {
            return Err(Error::dimension_mismatch(
                format!("{} bins", self.size()),
                format!("{} bins", probs.len()),
            ));
        }
        Ok(probs
            .iter()
            .zip(self.range())
            .map(|(&p, bin)| p * bin as f32)
            .sum())
    }

    /// Decode each row of a `(batch, size)` probability matrix.
    pub fn decode_batch(&self, probs: ArrayView2<f32>) -> Result<Array1<f32>> {
        if probs.ncols() != self.size() {
            return Err(Error::dimension_mismatch(
                format!("{} bins", self.size()),
                format!("{} bins", probs.ncols()),
            ));
        }
        Ok(probs.dot(&self.bins()))
    }

    /// Softmax each row of raw logits, then decode.
    pub fn decode_logits_batch(&self, logits: ArrayView2<f32>) -> Result<Array1<f32>> {
        let probs = softmax_rows(logits);
        self.decode_batch(probs.view())
    }
}

/// Invertible compression applied to scalar targets before encoding.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub enum ScalarScaling {
    /// Scalars are encoded as-is.
    #[default]
    Identity,
    /// `h(x) = sign(x)(sqrt(|x| + 1) - 1) + epsilon * x`
    Invertible { epsilon: f32 },
}

impl ScalarScaling {
    /// The scaling used for classic control targets.
    pub fn muzero() -> Self {
        ScalarScaling::Invertible { epsilon: 0.001 }
    }

    pub fn apply(&self, x: f32) -> f32 {
        match *self {
            ScalarScaling::Identity => x,
            ScalarScaling::Invertible { epsilon } => {
                x.signum() * ((x.abs() + 1.0).sqrt() - 1.0) + epsilon * x
            }
        }
    }

    pub fn invert(&self, y: f32) -> f32 {
        match *self {
            ScalarScaling::Identity => y,
            ScalarScaling::Invertible { epsilon } => {
                let inner = ((1.0 + 4.0 * epsilon * (y.abs() + 1.0 + epsilon)).sqrt() - 1.0)
                    / (2.0 * epsilon);
                y.signum() * (inner * inner - 1.0)
            }
        }
    }
}
