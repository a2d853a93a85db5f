//! boostfit: gradient-boosted regression trees trained from JSON documents.
//!
//! Native Rust histogram-based gradient boosting with categorical feature
//! support, plus the one-shot pipeline behind the `train_boost` binary.
//!
//! # Key Types
//!
//! - [`GBDTModel`] - High-level model with train/predict/save/load
//! - [`GBDTConfig`] - Configuration builder
//! - [`Objective`] / [`Metric`] - Training objectives and evaluation metrics
//! - [`TrainingDocument`] / [`Dataset`] - Data handling
//!
//! # Training
//!
//! Use `GBDTConfig::builder()` to configure, then `GBDTModel::train()`.
//! See the [`model`] module for details, and [`pipeline`] for the
//! load → split → fit → save run.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod model;
pub mod persist;
pub mod pipeline;
pub mod repr;
pub mod testing;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use model::gbdt::GBDTConfig;
pub use model::{GBDTModel, ModelMeta};

pub use training::{Metric, MetricFn, Objective, ObjectiveFn};

pub use data::{
    Dataset, DatasetBuilder, DatasetError, DatasetSchema, FeatureMeta, FeatureType, TrainingDocument,
};

pub use utils::{Parallelism, run_with_threads};
