//! Regression objective functions.

use ndarray::ArrayView1;

use super::ObjectiveFn;
use crate::training::Gradients;
use crate::training::metrics::Metric;

// =============================================================================
// Squared Loss
// =============================================================================

/// Squared error loss (L2 loss) for regression.
///
/// - Loss: `0.5 * (pred - target)²`
/// - Gradient: `pred - target`
/// - Hessian: `1.0`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SquaredLoss;

impl ObjectiveFn for SquaredLoss {
    fn compute_gradients_into(
        &self,
        predictions: ArrayView1<f32>,
        targets: ArrayView1<f32>,
        gradients: &mut Gradients,
    ) {
        let (grads, hess) = gradients.grads_hess_mut();
        for (((g, h), &pred), &target) in grads
            .iter_mut()
            .zip(hess.iter_mut())
            .zip(predictions.iter())
            .zip(targets.iter())
        {
            *g = pred - target;
            *h = 1.0;
        }
    }

    fn compute_base_score(&self, targets: ArrayView1<f32>) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }
        let sum: f64 = targets.iter().map(|&y| y as f64).sum();
        (sum / targets.len() as f64) as f32
    }

    fn default_metric(&self) -> Metric {
        Metric::rmse()
    }

    fn name(&self) -> &'static str {
        "squared"
    }
}

// =============================================================================
// Absolute Loss (MAE / L1)
// =============================================================================

/// Absolute error loss (L1 loss) for robust regression.
///
/// - Loss: `|pred - target|`
/// - Gradient: `sign(pred - target)`
/// - Hessian: `1.0` (constant for Newton step stability)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsoluteLoss;

impl ObjectiveFn for AbsoluteLoss {
    fn compute_gradients_into(
        &self,
        predictions: ArrayView1<f32>,
        targets: ArrayView1<f32>,
        gradients: &mut Gradients,
    ) {
        let (grads, hess) = gradients.grads_hess_mut();
        for (((g, h), &pred), &target) in grads
            .iter_mut()
            .zip(hess.iter_mut())
            .zip(predictions.iter())
            .zip(targets.iter())
        {
            let diff = pred - target;
            *g = if diff == 0.0 { 0.0 } else { diff.signum() };
            *h = 1.0;
        }
    }

    /// Median of the targets (optimal for L1 loss).
    fn compute_base_score(&self, targets: ArrayView1<f32>) -> f32 {
        compute_quantile(targets, 0.5)
    }

    fn default_metric(&self) -> Metric {
        Metric::mae()
    }

    fn name(&self) -> &'static str {
        "absolute"
    }
}

/// Lower `alpha`-quantile of `values`.
fn compute_quantile(values: ArrayView1<f32>, alpha: f32) -> f32 {
    let mut sorted: Vec<f32> = values.to_vec();
    if sorted.is_empty() {
        return 0.0;
    }
    sorted.sort_unstable_by(f32::total_cmp);

    let target = alpha * sorted.len() as f32;
    let idx = (target.ceil() as usize).saturating_sub(1).min(sorted.len() - 1);
    sorted[idx]
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn squared_loss_gradients() {
        let preds = array![1.0, 2.0, 3.0];
        let targets = array![0.5, 2.5, 2.5];
        let mut gradients = Gradients::new(3);

        SquaredLoss.compute_gradients_into(preds.view(), targets.view(), &mut gradients);

        assert_abs_diff_eq!(gradients.grads()[0], 0.5);
        assert_abs_diff_eq!(gradients.grads()[1], -0.5);
        assert_abs_diff_eq!(gradients.grads()[2], 0.5);
        assert!(gradients.hess().iter().all(|&h| h == 1.0));
    }

    #[test]
    fn squared_loss_base_score_is_mean() {
        assert_abs_diff_eq!(SquaredLoss.compute_base_score(array![1.0, 2.0, 6.0].view()), 3.0);
        assert_eq!(SquaredLoss.compute_base_score(array![].view()), 0.0);
    }

    #[test]
    fn absolute_loss_gradients() {
        let preds = array![1.0, 2.0, 3.0];
        let targets = array![0.5, 2.5, 3.0];
        let mut gradients = Gradients::new(3);

        AbsoluteLoss.compute_gradients_into(preds.view(), targets.view(), &mut gradients);
        assert_eq!(gradients.grads(), &[1.0, -1.0, 0.0]);
    }

    #[test]
    fn absolute_loss_base_score_is_median() {
        assert_eq!(AbsoluteLoss.compute_base_score(array![5.0, 1.0, 3.0].view()), 3.0);
        assert_eq!(AbsoluteLoss.compute_base_score(array![4.0, 1.0, 3.0, 2.0].view()), 2.0);
    }
}
