//! GBDT model implementation.
//!
//! High-level wrapper around [`Forest`] with training and prediction.
//! Access components via [`forest()`](GBDTModel::forest), [`meta()`](GBDTModel::meta),
//! and [`config()`](GBDTModel::config).

use std::collections::BTreeMap;

use ndarray::Array1;
use serde_json::Value;

use crate::data::{BinnedDataset, Dataset};
use crate::model::meta::ModelMeta;
use crate::repr::gbdt::Forest;
use crate::training::gbdt::{GBDTTrainer, TrainError};
use crate::training::EvalSet;
use crate::utils::{Parallelism, run_with_threads};

use super::GBDTConfig;

/// Name of the monitoring set passed to [`GBDTModel::train`].
pub const VALID_SET_NAME: &str = "valid";

/// High-level GBDT model with training and prediction.
#[derive(Clone, PartialEq)]
pub struct GBDTModel {
    forest: Forest,
    meta: ModelMeta,
    config: GBDTConfig,
}

impl GBDTModel {
    /// Create a model from all its parts.
    ///
    /// Used when loading from the native format.
    pub fn from_parts(forest: Forest, meta: ModelMeta, config: GBDTConfig) -> Self {
        Self { forest, meta, config }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn config(&self) -> &GBDTConfig {
        &self.config
    }

    /// Whether the model holds at least one trained tree.
    pub fn is_fitted(&self) -> bool {
        self.forest.n_trees() > 0
    }

    /// Resolved hyperparameters, keyed by name in sorted order.
    pub fn params(&self) -> BTreeMap<String, Value> {
        self.config.to_params()
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Train a new GBDT model.
    ///
    /// * `train` - training rows, must carry targets
    /// * `valid` - optional validation rows used for monitoring, early
    ///   stopping and best-iteration selection
    /// * `config` - training configuration; `config.n_threads` sizes the
    ///   thread pool (0 = auto, 1 = sequential)
    pub fn train(train: &Dataset, valid: Option<&Dataset>, config: GBDTConfig) -> Result<Self, TrainError> {
        let n_threads = config.n_threads;
        run_with_threads(n_threads, |parallelism| Self::train_inner(train, valid, config, parallelism))
    }

    fn train_inner(
        train: &Dataset,
        valid: Option<&Dataset>,
        config: GBDTConfig,
        parallelism: Parallelism,
    ) -> Result<Self, TrainError> {
        let targets = train.targets().ok_or_else(|| TrainError::MissingTargets {
            set: "train".to_string(),
        })?;
        if train.n_samples() == 0 {
            return Err(TrainError::EmptyDataset);
        }

        let binned = BinnedDataset::from_dataset(train, config.max_bins, parallelism);

        let eval_sets: Vec<EvalSet<'_>> = valid
            .map(|dataset| EvalSet {
                name: VALID_SET_NAME,
                dataset,
            })
            .into_iter()
            .collect();

        let trainer = GBDTTrainer::new(config.objective, config.resolved_metric(), config.to_trainer_params());
        let outcome = trainer.train(&binned, targets, &eval_sets, parallelism)?;

        let meta = ModelMeta {
            schema: train.schema().clone(),
            n_rounds: outcome.n_rounds,
            best_iteration: outcome.best_iteration,
            best_score: outcome.best_score,
        };

        Ok(Self {
            forest: outcome.forest,
            meta,
            config,
        })
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Predict one value per row of `dataset`.
    ///
    /// # Panics
    ///
    /// If `dataset` has a different number of features than the training data.
    pub fn predict(&self, dataset: &Dataset) -> Array1<f32> {
        assert_eq!(
            dataset.n_features(),
            self.meta.n_features(),
            "dataset feature count does not match the model"
        );
        run_with_threads(self.config.n_threads, |parallelism| self.forest.predict(dataset, parallelism))
    }

    /// Predict a single row given in feature order.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.forest.predict_row(features)
    }
}

impl std::fmt::Debug for GBDTModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GBDTModel")
            .field("n_trees", &self.forest.n_trees())
            .field("n_features", &self.meta.n_features())
            .field("best_iteration", &self.meta.best_iteration)
            .finish()
    }
}
