//! Regression metrics.

use ndarray::ArrayView1;

use super::MetricFn;

// =============================================================================
// RMSE (Root Mean Squared Error)
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - label)²))
///
/// Lower is better. Used for regression tasks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rmse;

impl MetricFn for Rmse {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f64 {
        let n_rows = predictions.len();
        if n_rows == 0 {
            return 0.0;
        }

        let sum_sq: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(&p, &l)| {
                let diff = (p as f64) - (l as f64);
                diff * diff
            })
            .sum();

        (sum_sq / n_rows as f64).sqrt()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

// =============================================================================
// MAE (Mean Absolute Error)
// =============================================================================

/// Mean Absolute Error: mean(|pred - label|)
///
/// Lower is better. More robust to outliers than RMSE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mae;

impl MetricFn for Mae {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f64 {
        let n_rows = predictions.len();
        if n_rows == 0 {
            return 0.0;
        }

        let sum_abs: f64 = predictions
            .iter()
            .zip(targets.iter())
            .map(|(&p, &l)| ((p as f64) - (l as f64)).abs())
            .sum();

        sum_abs / n_rows as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}
