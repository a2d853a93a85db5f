//! Objective (loss) functions for gradient boosting.
//!
//! Objectives compute per-sample gradients and hessians of the loss with
//! respect to the current raw prediction, plus the constant base score used
//! before the first tree.
//!
//! # Available Objectives
//!
//! - [`SquaredLoss`]: Standard squared error (L2 loss)
//! - [`AbsoluteLoss`]: Mean absolute error (L1 loss)

mod regression;

pub use regression::{AbsoluteLoss, SquaredLoss};

use ndarray::ArrayView1;

use crate::training::Gradients;
use crate::training::metrics::Metric;

// =============================================================================
// Objective Trait
// =============================================================================

/// An objective (loss) function for training gradient boosted models.
pub trait ObjectiveFn: Send + Sync {
    /// Fill `gradients` for the given predictions.
    ///
    /// `predictions`, `targets` and `gradients` share one length.
    fn compute_gradients_into(
        &self,
        predictions: ArrayView1<f32>,
        targets: ArrayView1<f32>,
        gradients: &mut Gradients,
    );

    /// Optimal constant prediction before any trees are added.
    fn compute_base_score(&self, targets: ArrayView1<f32>) -> f32;

    /// Metric reported when none is configured.
    fn default_metric(&self) -> Metric;

    /// Name of the objective (for logging and persistence).
    fn name(&self) -> &'static str;
}

// =============================================================================
// Objective Enum (Convenience wrapper)
// =============================================================================

/// Objective function enum for configuration.
///
/// Implements [`ObjectiveFn`] by delegating to the wrapped loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Objective {
    /// Squared error loss (L2) for regression.
    SquaredLoss(SquaredLoss),
    /// Absolute error loss (L1) for robust regression.
    AbsoluteLoss(AbsoluteLoss),
}

impl Objective {
    /// Squared error (L2) loss for regression.
    pub fn squared() -> Self {
        Self::SquaredLoss(SquaredLoss)
    }

    /// Absolute error (L1) loss for robust regression.
    pub fn absolute() -> Self {
        Self::AbsoluteLoss(AbsoluteLoss)
    }

    /// Look an objective up by its [`ObjectiveFn::name`].
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "squared" => Some(Self::squared()),
            "absolute" => Some(Self::absolute()),
            _ => None,
        }
    }
}

impl Default for Objective {
    fn default() -> Self {
        Self::squared()
    }
}

impl ObjectiveFn for Objective {
    fn compute_gradients_into(
        &self,
        predictions: ArrayView1<f32>,
        targets: ArrayView1<f32>,
        gradients: &mut Gradients,
    ) {
        match self {
            Self::SquaredLoss(inner) => inner.compute_gradients_into(predictions, targets, gradients),
            Self::AbsoluteLoss(inner) => inner.compute_gradients_into(predictions, targets, gradients),
        }
    }

    fn compute_base_score(&self, targets: ArrayView1<f32>) -> f32 {
        match self {
            Self::SquaredLoss(inner) => inner.compute_base_score(targets),
            Self::AbsoluteLoss(inner) => inner.compute_base_score(targets),
        }
    }

    fn default_metric(&self) -> Metric {
        match self {
            Self::SquaredLoss(inner) => inner.default_metric(),
            Self::AbsoluteLoss(inner) => inner.default_metric(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::SquaredLoss(inner) => inner.name(),
            Self::AbsoluteLoss(inner) => inner.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_name_round_trips() {
        for obj in [Objective::squared(), Objective::absolute()] {
            assert_eq!(Objective::from_name(obj.name()), Some(obj));
        }
        assert_eq!(Objective::from_name("logistic"), None);
    }

    #[test]
    fn default_is_squared() {
        assert_eq!(Objective::default(), Objective::squared());
        assert_eq!(Objective::default().default_metric(), Metric::rmse());
    }
}
