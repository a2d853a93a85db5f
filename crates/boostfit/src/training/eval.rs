//! Evaluation utilities for training.
//!
//! Provides the [`Evaluator`] component for computing metrics during training,
//! and [`MetricValue`] for wrapping computed metrics with metadata.

use ndarray::ArrayView1;

use crate::data::Dataset;

use super::metrics::MetricFn;

// =============================================================================
// MetricValue
// =============================================================================

/// A computed metric value with metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    /// Name of the metric (e.g., "train-rmse", "valid-rmse").
    pub name: String,
    pub value: f64,
    /// Whether higher values are better.
    pub higher_is_better: bool,
}

impl MetricValue {
    pub fn new(name: impl Into<String>, value: f64, higher_is_better: bool) -> Self {
        Self {
            name: name.into(),
            value,
            higher_is_better,
        }
    }

    /// Returns true if this value is better than another.
    pub fn is_better_than(&self, other: &Self) -> bool {
        if self.higher_is_better {
            self.value > other.value
        } else {
            self.value < other.value
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.6}", self.name, self.value)
    }
}

// =============================================================================
// EvalSet
// =============================================================================

/// Named evaluation dataset. The dataset must carry targets.
#[derive(Debug, Clone, Copy)]
pub struct EvalSet<'a> {
    pub name: &'a str,
    pub dataset: &'a Dataset,
}

impl<'a> EvalSet<'a> {
    pub fn new(name: &'a str, dataset: &'a Dataset) -> Self {
        Self { name, dataset }
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Computes the configured metric on the training set and every eval set.
///
/// # Example
///
/// ```
/// use boostfit::training::{Evaluator, Metric};
/// use ndarray::array;
///
/// let metric = Metric::rmse();
/// let evaluator = Evaluator::new(&metric);
///
/// let preds = array![1.0f32, 2.0];
/// let targets = array![1.0f32, 2.0];
/// let metrics = evaluator.evaluate_round(preds.view(), targets.view(), &[], &[]);
/// assert_eq!(metrics[0].name, "train-rmse");
/// assert_eq!(metrics[0].value, 0.0);
/// ```
pub struct Evaluator<'a, M: MetricFn> {
    metric: &'a M,
}

impl<'a, M: MetricFn> Evaluator<'a, M> {
    pub fn new(metric: &'a M) -> Self {
        Self { metric }
    }

    /// Whether higher metric values are better.
    pub fn higher_is_better(&self) -> bool {
        self.metric.higher_is_better()
    }

    pub fn metric_name(&self) -> &'static str {
        self.metric.name()
    }

    /// Compute the metric and wrap it in a [`MetricValue`].
    pub fn compute_metric(
        &self,
        name: impl Into<String>,
        predictions: ArrayView1<f32>,
        targets: ArrayView1<f32>,
    ) -> MetricValue {
        let value = self.metric.compute(predictions, targets);
        MetricValue::new(name, value, self.higher_is_better())
    }

    /// Evaluate predictions on training and eval sets for one round.
    ///
    /// The training metric comes first, followed by one entry per eval set in
    /// order. Eval sets without targets are skipped.
    pub fn evaluate_round(
        &self,
        train_predictions: ArrayView1<f32>,
        train_targets: ArrayView1<f32>,
        eval_sets: &[EvalSet<'_>],
        eval_predictions: &[Vec<f32>],
    ) -> Vec<MetricValue> {
        let mut metrics = Vec::with_capacity(1 + eval_sets.len());

        metrics.push(self.compute_metric(
            format!("train-{}", self.metric_name()),
            train_predictions,
            train_targets,
        ));

        for (eval_set, preds) in eval_sets.iter().zip(eval_predictions) {
            let Some(targets) = eval_set.dataset.targets() else {
                continue;
            };
            metrics.push(self.compute_metric(
                format!("{}-{}", eval_set.name, self.metric_name()),
                ArrayView1::from(preds.as_slice()),
                targets,
            ));
        }

        metrics
    }

    /// Value used for early stopping.
    ///
    /// Index 0 of `metrics` is the training metric; eval sets follow. Falls
    /// back to the training metric when the eval set is absent.
    pub fn early_stop_value(metrics: &[MetricValue], eval_set_idx: usize) -> f64 {
        let idx = if eval_set_idx + 1 < metrics.len() {
            eval_set_idx + 1
        } else {
            0
        };
        metrics.get(idx).map_or(f64::NAN, |m| m.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::Metric;
    use ndarray::array;

    #[test]
    fn metric_value_comparison() {
        let rmse1 = MetricValue::new("rmse", 0.5, false);
        let rmse2 = MetricValue::new("rmse", 0.7, false);
        assert!(rmse1.is_better_than(&rmse2));
        assert!(!rmse2.is_better_than(&rmse1));

        let acc1 = MetricValue::new("acc", 0.9, true);
        let acc2 = MetricValue::new("acc", 0.8, true);
        assert!(acc1.is_better_than(&acc2));
    }

    #[test]
    fn metric_value_display() {
        let m = MetricValue::new("train-rmse", 0.123456, false);
        assert_eq!(format!("{}", m), "train-rmse: 0.123456");
    }

    #[test]
    fn evaluate_round_names_sets() {
        let valid = Dataset::builder()
            .add_feature("x", vec![0.0, 1.0])
            .targets(vec![1.0, 3.0])
            .build()
            .unwrap();
        let metric = Metric::mae();
        let evaluator = Evaluator::new(&metric);

        let train_preds = array![0.0f32, 0.0];
        let train_targets = array![1.0f32, 1.0];
        let eval_sets = [EvalSet::new("valid", &valid)];
        let eval_preds = vec![vec![2.0f32, 2.0]];

        let metrics =
            evaluator.evaluate_round(train_preds.view(), train_targets.view(), &eval_sets, &eval_preds);

        assert_eq!(metrics.len(), 2);
        assert_eq!(metrics[0].name, "train-mae");
        assert_eq!(metrics[0].value, 1.0);
        assert_eq!(metrics[1].name, "valid-mae");
        assert_eq!(metrics[1].value, 1.0);

        assert_eq!(Evaluator::<Metric>::early_stop_value(&metrics, 0), 1.0);
        assert_eq!(Evaluator::<Metric>::early_stop_value(&metrics[..1], 0), 1.0);
    }
}
