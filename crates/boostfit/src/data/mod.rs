//! Data loading and preparation.
//!
//! - [`TrainingDocument`]: JSON training document loader
//! - [`Dataset`] / [`DatasetBuilder`]: feature-major raw feature container
//! - [`DatasetSchema`]: feature names, types and category vocabularies
//! - [`train_valid_split`]: seeded train/validation partition
//! - [`BinnedDataset`]: quantized features used by the trainer

mod binned;
mod categories;
mod dataset;
mod document;
mod error;
mod schema;
mod split;

pub use binned::{BinMapper, BinnedDataset, DEFAULT_MAX_BINS};
pub use categories::{CategoryVocab, category_label};
pub use dataset::{Dataset, DatasetBuilder};
pub use document::{DocumentError, TARGET_COLUMN, TrainingDocument, categorical_feature_indices};
pub use error::DatasetError;
pub use schema::{DatasetSchema, FeatureMeta, FeatureType};
pub use split::{SplitError, TrainValidSplit, train_valid_split, validation_size};
