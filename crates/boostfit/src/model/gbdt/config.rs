//! High-level GBDT configuration with builder pattern.
//!
//! [`GBDTConfig`] composes nested parameter groups and uses the `bon` crate
//! for builder generation with validation at `build()`.
//!
//! # Example
//!
//! ```
//! use boostfit::model::gbdt::{GBDTConfig, TreeParams};
//! use boostfit::training::Metric;
//!
//! // All defaults
//! let config = GBDTConfig::builder().build().unwrap();
//! assert_eq!(config.n_trees, 100);
//!
//! let config = GBDTConfig::builder()
//!     .metric(Metric::mae())
//!     .n_trees(200)
//!     .learning_rate(0.1)
//!     .tree(TreeParams::depth_wise(8))
//!     .early_stopping_rounds(20)
//!     .build()
//!     .unwrap();
//! assert_eq!(config.early_stopping_rounds, Some(20));
//! ```

use std::collections::BTreeMap;

use bon::Builder;
use serde_json::{Value, json};

use super::params::{ParamValidationError, RegularizationParams, TreeParams};
use crate::data::DEFAULT_MAX_BINS;
use crate::training::gbdt::{GBDTParams, GrowthStrategy};
use crate::training::{Metric, MetricFn, Objective, ObjectiveFn, Verbosity};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors raised by [`GBDTConfigBuilder::build`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("learning_rate must be positive and finite, got {0}")]
    InvalidLearningRate(f32),

    #[error("n_trees must be at least 1")]
    InvalidNTrees,

    #[error("max_bins must be in 2..=65535, got {0}")]
    InvalidMaxBins(u32),

    #[error("invalid {field}: {reason}")]
    InvalidParam { field: &'static str, reason: String },
}

impl From<ParamValidationError> for ConfigError {
    fn from(e: ParamValidationError) -> Self {
        let field = match e {
            ParamValidationError::InvalidLambda(_) => "lambda",
            ParamValidationError::InvalidAlpha(_) => "alpha",
            ParamValidationError::InvalidMinChildWeight(_) => "min_child_weight",
            ParamValidationError::InvalidMinGain(_) => "min_gain",
            ParamValidationError::InvalidMaxDepth(_) => "max_depth",
            ParamValidationError::InvalidMaxLeaves(_) => "max_leaves",
        };
        ConfigError::InvalidParam {
            field,
            reason: e.to_string(),
        }
    }
}

// =============================================================================
// GBDTConfig
// =============================================================================

/// High-level configuration for GBDT model training.
///
/// # Structure
///
/// - **Objective & Metric**: what to optimize and how to measure progress
/// - **Boosting**: `n_trees` and `learning_rate`
/// - **Tree**: tree structure via [`TreeParams`]
/// - **Regularization**: overfitting control via [`RegularizationParams`]
/// - **Binning**: `max_bins` per numeric feature
/// - **Early Stopping / best model**: monitoring of the validation set
/// - **Resources & logging**: threads, verbosity
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct GBDTConfig {
    // === Objective & Metric ===
    /// Loss function. Default: squared error.
    #[builder(default)]
    pub objective: Objective,

    /// Evaluation metric. `None` uses the objective's default metric.
    pub metric: Option<Metric>,

    // === Boosting parameters ===
    /// Number of boosting rounds. Default: 100.
    #[builder(default = 100)]
    pub n_trees: u32,

    /// Learning rate (shrinkage). Default: 0.3.
    #[builder(default = 0.3)]
    pub learning_rate: f32,

    // === Nested parameter groups ===
    #[builder(default)]
    pub tree: TreeParams,

    #[builder(default)]
    pub regularization: RegularizationParams,

    // === Binning ===
    /// Maximum value bins per numeric feature. Default: 254.
    #[builder(default = DEFAULT_MAX_BINS)]
    pub max_bins: u32,

    // === Early stopping ===
    /// Stop training if the validation metric has not improved for this many
    /// rounds. `None` disables early stopping.
    pub early_stopping_rounds: Option<u32>,

    /// Keep only the trees up to the best validation iteration. Default: true.
    #[builder(default = true)]
    pub use_best_model: bool,

    // === Resource control ===
    /// Thread count: 0 = auto, 1 = sequential, n = exactly n. Default: 0.
    #[builder(default = 0)]
    pub n_threads: usize,

    // === Logging ===
    #[builder(default)]
    pub verbosity: Verbosity,

    /// Log metrics every `log_period` rounds. Default: 1.
    #[builder(default = 1)]
    pub log_period: usize,
}

impl<S: g_b_d_t_config_builder::IsComplete> GBDTConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid.
    pub fn build(self) -> Result<GBDTConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl GBDTConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(ConfigError::InvalidLearningRate(self.learning_rate));
        }
        if self.n_trees == 0 {
            return Err(ConfigError::InvalidNTrees);
        }
        if !(2..=u16::MAX as u32).contains(&self.max_bins) {
            return Err(ConfigError::InvalidMaxBins(self.max_bins));
        }
        self.tree.validate()?;
        self.regularization.validate()?;
        Ok(())
    }

    /// Metric used for evaluation: the configured one or the objective's default.
    pub fn resolved_metric(&self) -> Metric {
        self.metric.unwrap_or_else(|| self.objective.default_metric())
    }

    /// Convert to trainer parameters.
    pub fn to_trainer_params(&self) -> GBDTParams {
        GBDTParams {
            n_trees: self.n_trees,
            learning_rate: self.learning_rate,
            growth_strategy: self.tree.growth_strategy,
            max_onehot_cats: self.tree.max_onehot_cats,
            gain: self.regularization.to_gain_params(),
            early_stopping_rounds: self.early_stopping_rounds.unwrap_or(0),
            early_stopping_eval_set: 0,
            use_best_model: self.use_best_model,
            verbosity: self.verbosity,
            log_period: self.log_period,
        }
    }

    /// Resolved hyperparameters as a sorted key/value map.
    pub fn to_params(&self) -> BTreeMap<String, Value> {
        let mut params = BTreeMap::new();
        let mut put = |key: &str, value: Value| {
            params.insert(key.to_string(), value);
        };

        put("objective", json!(self.objective.name()));
        put("eval_metric", json!(self.resolved_metric().name()));
        put("n_trees", json!(self.n_trees));
        put("learning_rate", decimal(self.learning_rate));
        match self.tree.growth_strategy {
            GrowthStrategy::DepthWise { max_depth } => {
                put("grow_policy", json!("depthwise"));
                put("max_depth", json!(max_depth));
            }
            GrowthStrategy::LeafWise { max_leaves } => {
                put("grow_policy", json!("lossguide"));
                put("max_leaves", json!(max_leaves));
            }
        }
        put("max_onehot_cats", json!(self.tree.max_onehot_cats));
        put("reg_lambda", decimal(self.regularization.lambda));
        put("reg_alpha", decimal(self.regularization.alpha));
        put("min_child_weight", decimal(self.regularization.min_child_weight));
        put("min_gain", decimal(self.regularization.min_gain));
        put("min_samples_leaf", json!(self.regularization.min_samples_leaf));
        put("max_bins", json!(self.max_bins));
        put("early_stopping_rounds", json!(self.early_stopping_rounds));
        put("use_best_model", json!(self.use_best_model));
        put("n_threads", json!(self.n_threads));
        put("verbosity", json!(self.verbosity.as_str()));
        put("log_period", json!(self.log_period));

        params
    }
}

/// JSON number from the shortest decimal form of an `f32` (`0.03`, not
/// `0.029999999329447746`).
fn decimal(value: f32) -> Value {
    value.to_string().parse::<f64>().map_or(Value::Null, |v| json!(v))
}

impl Default for GBDTConfig {
    fn default() -> Self {
        // All builder defaults pass validation.
        Self::builder().__build_internal()
    }
}

// =============================================================================
// Tests
// =============================================================================
