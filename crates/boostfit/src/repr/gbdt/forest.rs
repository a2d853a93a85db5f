//! Canonical forest representation (collection of trees).

use ndarray::Array1;

use crate::data::Dataset;
use crate::utils::Parallelism;

use super::tree::{Tree, TreeValidationError};

/// Structural validation errors for [`Forest`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ForestValidationError {
    #[error("base score {0} is not finite")]
    NonFiniteBaseScore(f32),
    #[error("tree {tree_idx} is invalid: {error}")]
    InvalidTree {
        tree_idx: usize,
        error: TreeValidationError,
    },
}

/// Additive ensemble of regression trees.
///
/// The prediction for a sample is `base_score + sum(tree outputs)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Forest {
    trees: Vec<Tree>,
    base_score: f32,
}

impl Default for Forest {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Forest {
    pub fn new(base_score: f32) -> Self {
        Self {
            trees: Vec::new(),
            base_score,
        }
    }

    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    /// Keep only the first `n_trees` trees.
    pub fn truncate(&mut self, n_trees: usize) {
        self.trees.truncate(n_trees);
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    #[inline]
    pub fn tree(&self, idx: usize) -> &Tree {
        &self.trees[idx]
    }

    pub fn trees(&self) -> impl Iterator<Item = &Tree> {
        self.trees.iter()
    }

    /// Predict one sample.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        self.base_score + self.trees.iter().map(|t| t.predict_row(features)).sum::<f32>()
    }

    /// Predict every sample of `dataset`.
    pub fn predict(&self, dataset: &Dataset, parallelism: Parallelism) -> Array1<f32> {
        let mut output = vec![self.base_score; dataset.n_samples()];
        for tree in &self.trees {
            tree.predict_into(dataset, &mut output, parallelism);
        }
        Array1::from(output)
    }

    /// Validate structural invariants for every tree.
    pub fn validate(&self) -> Result<(), ForestValidationError> {
        if !self.base_score.is_finite() {
            return Err(ForestValidationError::NonFiniteBaseScore(self.base_score));
        }
        for (tree_idx, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|error| ForestValidationError::InvalidTree { tree_idx, error })?;
        }
        Ok(())
    }
}
