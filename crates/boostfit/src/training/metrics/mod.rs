//! Evaluation metrics for model quality.
//!
//! Metrics are separate from loss functions: a model might be trained with
//! one loss but evaluated with a different metric.
//!
//! # Available Metrics
//!
//! - [`Rmse`]: Root Mean Squared Error
//! - [`Mae`]: Mean Absolute Error

mod regression;

pub use regression::{Mae, Rmse};

use ndarray::ArrayView1;

/// A metric computed from predictions and targets.
pub trait MetricFn: Send + Sync {
    /// Metric value. `predictions` and `targets` share one length.
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f64;

    /// Whether higher values indicate better performance.
    fn higher_is_better(&self) -> bool;

    /// Name of the metric (for logging).
    fn name(&self) -> &'static str;
}

// =============================================================================
// Metric Enum (Convenience wrapper)
// =============================================================================

/// Runtime-selectable metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    /// Root Mean Squared Error (regression).
    Rmse(Rmse),
    /// Mean Absolute Error (regression).
    Mae(Mae),
}

impl Default for Metric {
    fn default() -> Self {
        Self::rmse()
    }
}

impl Metric {
    /// Root Mean Squared Error for regression.
    pub fn rmse() -> Self {
        Self::Rmse(Rmse)
    }

    /// Mean Absolute Error for regression.
    pub fn mae() -> Self {
        Self::Mae(Mae)
    }

    /// Look a metric up by its [`MetricFn::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rmse" => Some(Self::rmse()),
            "mae" => Some(Self::mae()),
            _ => None,
        }
    }
}

impl MetricFn for Metric {
    fn compute(&self, predictions: ArrayView1<f32>, targets: ArrayView1<f32>) -> f64 {
        match self {
            Self::Rmse(inner) => inner.compute(predictions, targets),
            Self::Mae(inner) => inner.compute(predictions, targets),
        }
    }

    fn higher_is_better(&self) -> bool {
        match self {
            Self::Rmse(inner) => inner.higher_is_better(),
            Self::Mae(inner) => inner.higher_is_better(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Rmse(inner) => inner.name(),
            Self::Mae(inner) => inner.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metric_names() {
        assert_eq!(Metric::rmse().name(), "rmse");
        assert_eq!(Metric::mae().name(), "mae");
        assert_eq!(Metric::from_name("mae"), Some(Metric::mae()));
        assert_eq!(Metric::from_name("auc"), None);
        assert!(!Metric::default().higher_is_better());
    }
}
