use ndarray::{Array1, Array2, ArrayView2, Axis};

use crate::error::{Error, Result};

/// Trait defining the interface for losses over categorical distributions
pub trait CategoricalLoss: Send + Sync {
    /// Loss for every row of a batch, not reduced
    fn compute_per_item(&self, logits: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<Array1<f32>>;

    /// Gradient of the per-item loss with respect to the logits
    fn gradient_batch(&self, logits: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// Mean of the per-item losses
    fn compute_batch(&self, logits: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<f32> {
        let per_item = self.compute_per_item(logits, targets)?;
        Ok(per_item.mean().unwrap_or(0.0))
    }
}

/// Cross-entropy between raw logits and a target distribution:
/// `-Σ target · log_softmax(logits)` per row.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftmaxCrossEntropy;

impl CategoricalLoss for SoftmaxCrossEntropy {
    fn compute_per_item(&self, logits: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<Array1<f32>> {
        check_shapes(logits, targets)?;
        let log_probs = log_softmax_rows(logits);
        Ok(-(&log_probs * &targets).sum_axis(Axis(1)))
    }

    fn gradient_batch(&self, logits: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<Array2<f32>> {
        check_shapes(logits, targets)?;
        let probs = softmax_rows(logits);
        // Targets need not sum to one (absorbing states carry all-zero policies).
        let mass = targets.sum_axis(Axis(1)).insert_axis(Axis(1));
        Ok(&probs * &mass - &targets)
    }
}

/// Per-row cross-entropy of raw logits against target distributions.
pub fn categorical_cross_entropy(logits: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<Array1<f32>> {
    SoftmaxCrossEntropy.compute_per_item(logits, targets)
}

/// Numerically stable row-wise log-softmax.
pub fn log_softmax_rows(logits: ArrayView2<f32>) -> Array2<f32> {
    let mut out = logits.to_owned();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        let log_sum = row.iter().map(|&v| (v - max).exp()).sum::<f32>().ln() + max;
        row.mapv_inplace(|v| v - log_sum);
    }
    out
}

/// Numerically stable row-wise softmax.
pub fn softmax_rows(logits: ArrayView2<f32>) -> Array2<f32> {
    let mut out = logits.to_owned();
    for mut row in out.axis_iter_mut(Axis(0)) {
        let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
    out
}

fn check_shapes(logits: ArrayView2<f32>, targets: ArrayView2<f32>) -> Result<()> {
    if logits.dim() != targets.dim() {
        return Err(Error::dimension_mismatch(
            format!("{:?}", logits.dim()),
            format!("{:?}", targets.dim()),
        ));
    }
    Ok(())
}
