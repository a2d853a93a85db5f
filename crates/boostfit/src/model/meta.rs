//! Model metadata.
//!
//! Introspection data recorded at training time and carried through
//! persistence.

use crate::data::{CategoryVocab, DatasetSchema, FeatureType};

/// Shared metadata for a trained model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelMeta {
    /// Feature names, types and category vocabularies of the training data.
    pub schema: DatasetSchema,
    /// Boosting rounds actually run (before any best-model truncation).
    pub n_rounds: usize,
    /// Best iteration on the validation set (0-based).
    pub best_iteration: Option<usize>,
    /// Validation metric at the best iteration.
    pub best_score: Option<f64>,
}

impl ModelMeta {
    pub fn new(schema: DatasetSchema) -> Self {
        Self {
            schema,
            ..Default::default()
        }
    }

    /// Set best iteration and its score.
    pub fn with_best(mut self, iteration: usize, score: f64) -> Self {
        self.best_iteration = Some(iteration);
        self.best_score = Some(score);
        self
    }

    pub fn n_features(&self) -> usize {
        self.schema.n_features()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.schema.feature_names()
    }

    pub fn feature_types(&self) -> Vec<FeatureType> {
        self.schema.iter().map(|f| f.feature_type).collect()
    }

    /// Category vocabulary of a categorical feature, if one was recorded.
    pub fn vocab(&self, feature: usize) -> Option<&CategoryVocab> {
        self.schema.get(feature).and_then(|f| f.vocab.as_ref())
    }
}
