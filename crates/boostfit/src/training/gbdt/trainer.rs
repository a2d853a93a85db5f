//! GBDT Trainer for gradient boosting.
//!
//! Orchestrates objective computation, tree growing, and prediction updates.
//! Use [`GBDTTrainer::train`] to train a forest from a binned dataset.

use ndarray::ArrayView1;

use crate::data::BinnedDataset;
use crate::repr::gbdt::Forest;
use crate::training::Gradients;
use crate::training::callback::{EarlyStopAction, EarlyStopping};
use crate::training::eval::{EvalSet, Evaluator};
use crate::training::logger::{TrainingLogger, Verbosity};
use crate::training::metrics::MetricFn;
use crate::training::objectives::ObjectiveFn;
use crate::utils::Parallelism;

use super::grower::{GrowerParams, GrowthStrategy, TreeGrower};
use super::split::GainParams;

// =============================================================================
// TrainError
// =============================================================================

/// Errors raised before or during boosting.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrainError {
    #[error("training dataset has no rows")]
    EmptyDataset,

    #[error("expected {expected} targets, got {got}")]
    TargetLengthMismatch { expected: usize, got: usize },

    #[error("target at row {row} is not finite")]
    NonFiniteTarget { row: usize },

    #[error("dataset `{set}` has no targets")]
    MissingTargets { set: String },

    #[error("target at row {row} of dataset `{set}` is not finite")]
    NonFiniteEvalTarget { set: String, row: usize },

    #[error("dataset `{set}` has {got} features, training data has {expected}")]
    EvalFeatureMismatch {
        set: String,
        expected: usize,
        got: usize,
    },
}

// =============================================================================
// GBDTParams
// =============================================================================

/// Parameters for GBDT training.
#[derive(Clone, Debug, PartialEq)]
pub struct GBDTParams {
    // --- Boosting parameters ---
    /// Number of boosting rounds (trees to train).
    pub n_trees: u32,
    /// Learning rate (shrinkage).
    pub learning_rate: f32,

    // --- Tree structure ---
    pub growth_strategy: GrowthStrategy,
    /// Max categories for one-hot categorical splits.
    pub max_onehot_cats: u32,

    // --- Regularization ---
    pub gain: GainParams,

    // --- Early stopping ---
    /// Stop after this many rounds without improvement; 0 disables.
    pub early_stopping_rounds: u32,
    /// Index of the eval set monitored for early stopping and best iteration.
    pub early_stopping_eval_set: usize,
    /// Truncate the forest to the best iteration on the monitored eval set.
    pub use_best_model: bool,

    // --- Logging ---
    pub verbosity: Verbosity,
    /// Log metrics every `log_period` rounds.
    pub log_period: usize,
}

impl Default for GBDTParams {
    fn default() -> Self {
        Self {
            n_trees: 100,
            learning_rate: 0.3,
            growth_strategy: GrowthStrategy::default(),
            max_onehot_cats: 4,
            gain: GainParams::default(),
            early_stopping_rounds: 0,
            early_stopping_eval_set: 0,
            use_best_model: true,
            verbosity: Verbosity::default(),
            log_period: 1,
        }
    }
}

impl GBDTParams {
    fn to_grower_params(&self) -> GrowerParams {
        GrowerParams {
            gain: self.gain.clone(),
            learning_rate: self.learning_rate,
            growth_strategy: self.growth_strategy,
            max_onehot_cats: self.max_onehot_cats,
        }
    }
}

/// Result of a training run.
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub forest: Forest,
    /// Rounds actually run (before any truncation).
    pub n_rounds: usize,
    /// Zero-based best round on the monitored set, when an eval set was given.
    pub best_iteration: Option<usize>,
    /// Metric value at `best_iteration`.
    pub best_score: Option<f64>,
}

// =============================================================================
// GBDTTrainer
// =============================================================================

/// GBDT Trainer.
pub struct GBDTTrainer<O: ObjectiveFn, M: MetricFn> {
    objective: O,
    metric: M,
    params: GBDTParams,
}

impl<O: ObjectiveFn, M: MetricFn> GBDTTrainer<O, M> {
    pub fn new(objective: O, metric: M, params: GBDTParams) -> Self {
        Self {
            objective,
            metric,
            params,
        }
    }

    pub fn params(&self) -> &GBDTParams {
        &self.params
    }

    pub fn objective(&self) -> &O {
        &self.objective
    }

    pub fn metric(&self) -> &M {
        &self.metric
    }

    /// Train a forest.
    ///
    /// This method does not create a thread pool; wrap the call in
    /// [`run_with_threads`](crate::utils::run_with_threads) to control it.
    ///
    /// * `dataset` - binned training features
    /// * `targets` - one target per training row
    /// * `eval_sets` - validation sets for monitoring (`&[]` to skip)
    pub fn train(
        &self,
        dataset: &BinnedDataset,
        targets: ArrayView1<f32>,
        eval_sets: &[EvalSet<'_>],
        parallelism: Parallelism,
    ) -> Result<TrainOutcome, TrainError> {
        let n_rows = dataset.n_samples();
        self.validate_inputs(dataset, targets, eval_sets)?;

        let mut grower = TreeGrower::new(dataset, self.params.to_grower_params(), parallelism);
        let mut gradients = Gradients::new(n_rows);

        let base_score = self.objective.compute_base_score(targets);
        let mut predictions = vec![base_score; n_rows];
        let mut forest = Forest::new(base_score);

        let mut eval_predictions: Vec<Vec<f32>> = eval_sets
            .iter()
            .map(|es| vec![base_score; es.dataset.n_samples()])
            .collect();

        let monitor_eval = self.params.early_stopping_eval_set < eval_sets.len();
        let mut early_stopping = EarlyStopping::new(
            self.params.early_stopping_rounds as usize,
            self.metric.higher_is_better(),
        );
        let evaluator = Evaluator::new(&self.metric);

        let mut logger = TrainingLogger::new(self.params.verbosity, self.params.log_period);
        logger.start_training(self.params.n_trees as usize);

        let mut n_rounds = 0;
        for round in 0..self.params.n_trees as usize {
            self.objective
                .compute_gradients_into(ArrayView1::from(&predictions[..]), targets, &mut gradients);

            let tree = grower.grow(dataset, &gradients);
            logger.log_tree(round, tree.n_leaves());

            // Fast path: the partitioner holds every training row.
            grower.update_predictions_from_last_tree(&mut predictions);

            for (eval_set, preds) in eval_sets.iter().zip(eval_predictions.iter_mut()) {
                tree.predict_into(eval_set.dataset, preds, parallelism);
            }

            forest.push_tree(tree);
            n_rounds += 1;

            let round_metrics =
                evaluator.evaluate_round(ArrayView1::from(&predictions[..]), targets, eval_sets, &eval_predictions);
            logger.log_metrics(round, &round_metrics);

            let monitor_value =
                Evaluator::<M>::early_stop_value(&round_metrics, self.params.early_stopping_eval_set);
            if early_stopping.update(monitor_value) == EarlyStopAction::Stop {
                logger.log_early_stopping(round, early_stopping.best_round(), self.metric.name());
                break;
            }
        }

        let (best_iteration, best_score) = match early_stopping.best_value() {
            Some(value) if monitor_eval => (Some(early_stopping.best_round()), Some(value)),
            _ => (None, None),
        };

        if let (Some(best), Some(score)) = (best_iteration, best_score) {
            logger.log_best_iteration(best, score);
            if self.params.use_best_model {
                forest.truncate(best + 1);
            }
        }

        logger.finish_training();

        Ok(TrainOutcome {
            forest,
            n_rounds,
            best_iteration,
            best_score,
        })
    }

    fn validate_inputs(
        &self,
        dataset: &BinnedDataset,
        targets: ArrayView1<f32>,
        eval_sets: &[EvalSet<'_>],
    ) -> Result<(), TrainError> {
        let n_rows = dataset.n_samples();
        if n_rows == 0 {
            return Err(TrainError::EmptyDataset);
        }
        if targets.len() != n_rows {
            return Err(TrainError::TargetLengthMismatch {
                expected: n_rows,
                got: targets.len(),
            });
        }
        if let Some(row) = targets.iter().position(|t| !t.is_finite()) {
            return Err(TrainError::NonFiniteTarget { row });
        }

        for eval_set in eval_sets {
            let set = eval_set.name.to_string();
            if eval_set.dataset.n_features() != dataset.n_features() {
                return Err(TrainError::EvalFeatureMismatch {
                    set,
                    expected: dataset.n_features(),
                    got: eval_set.dataset.n_features(),
                });
            }
            let Some(eval_targets) = eval_set.dataset.targets() else {
                return Err(TrainError::MissingTargets { set });
            };
            if let Some(row) = eval_targets.iter().position(|t| !t.is_finite()) {
                return Err(TrainError::NonFiniteEvalTarget { set, row });
            }
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
