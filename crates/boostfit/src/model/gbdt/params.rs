//! Nested parameter groups for GBDT configuration.
//!
//! - [`TreeParams`]: tree structure (growth strategy, categorical handling)
//! - [`RegularizationParams`]: L1/L2 regularization and split constraints

use crate::training::gbdt::{GainParams, GrowthStrategy};

/// Largest supported depth for depth-wise growth.
pub const MAX_TREE_DEPTH: u32 = 16;

// =============================================================================
// TreeParams
// =============================================================================

/// Tree structure parameters.
///
/// # Example
///
/// ```
/// use boostfit::model::gbdt::TreeParams;
///
/// // Depth-limited trees (XGBoost style)
/// let params = TreeParams::depth_wise(8);
/// assert_eq!(params.max_depth(), Some(8));
///
/// // Leaf-limited trees (LightGBM style)
/// let params = TreeParams::leaf_wise(63);
/// assert_eq!(params.max_leaves(), Some(63));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    pub growth_strategy: GrowthStrategy,
    /// Maximum categories for one-vs-rest categorical splits.
    /// Features with more categories use gradient-sorted partitions.
    pub max_onehot_cats: u32,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            growth_strategy: GrowthStrategy::default(),
            max_onehot_cats: 4,
        }
    }
}

impl TreeParams {
    pub fn depth_wise(max_depth: u32) -> Self {
        Self {
            growth_strategy: GrowthStrategy::DepthWise { max_depth },
            ..Default::default()
        }
    }

    pub fn leaf_wise(max_leaves: u32) -> Self {
        Self {
            growth_strategy: GrowthStrategy::LeafWise { max_leaves },
            ..Default::default()
        }
    }

    pub fn with_max_onehot_cats(mut self, max_onehot_cats: u32) -> Self {
        self.max_onehot_cats = max_onehot_cats;
        self
    }

    pub fn max_depth(&self) -> Option<u32> {
        match self.growth_strategy {
            GrowthStrategy::DepthWise { max_depth } => Some(max_depth),
            GrowthStrategy::LeafWise { .. } => None,
        }
    }

    pub fn max_leaves(&self) -> Option<u32> {
        match self.growth_strategy {
            GrowthStrategy::DepthWise { .. } => None,
            GrowthStrategy::LeafWise { max_leaves } => Some(max_leaves),
        }
    }

    /// # Errors
    ///
    /// Depth must be in `1..=16`; leaf-wise growth needs at least 2 leaves.
    pub fn validate(&self) -> Result<(), ParamValidationError> {
        match self.growth_strategy {
            GrowthStrategy::DepthWise { max_depth } if max_depth == 0 || max_depth > MAX_TREE_DEPTH => {
                Err(ParamValidationError::InvalidMaxDepth(max_depth))
            }
            GrowthStrategy::LeafWise { max_leaves } if max_leaves < 2 => {
                Err(ParamValidationError::InvalidMaxLeaves(max_leaves))
            }
            _ => Ok(()),
        }
    }
}

// =============================================================================
// RegularizationParams
// =============================================================================

/// Regularization parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RegularizationParams {
    /// L2 regularization term on leaf weights. Default: 1.0.
    pub lambda: f32,

    /// L1 regularization term on leaf weights. Default: 0.0.
    pub alpha: f32,

    /// Minimum sum of hessians required in a leaf. Default: 1.0.
    pub min_child_weight: f32,

    /// Minimum gain required to make a split. Default: 0.0.
    pub min_gain: f32,

    /// Minimum number of samples required in a leaf. Default: 1.
    pub min_samples_leaf: u32,
}

impl Default for RegularizationParams {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            alpha: 0.0,
            min_child_weight: 1.0,
            min_gain: 0.0,
            min_samples_leaf: 1,
        }
    }
}

impl RegularizationParams {
    /// # Errors
    ///
    /// Every field must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ParamValidationError> {
        let invalid = |v: f32| !v.is_finite() || v < 0.0;
        if invalid(self.lambda) {
            return Err(ParamValidationError::InvalidLambda(self.lambda));
        }
        if invalid(self.alpha) {
            return Err(ParamValidationError::InvalidAlpha(self.alpha));
        }
        if invalid(self.min_child_weight) {
            return Err(ParamValidationError::InvalidMinChildWeight(self.min_child_weight));
        }
        if invalid(self.min_gain) {
            return Err(ParamValidationError::InvalidMinGain(self.min_gain));
        }
        Ok(())
    }

    pub fn to_gain_params(&self) -> GainParams {
        GainParams {
            reg_lambda: self.lambda,
            reg_alpha: self.alpha,
            min_gain: self.min_gain,
            min_child_weight: self.min_child_weight,
            min_samples_leaf: self.min_samples_leaf,
        }
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Parameter validation error.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamValidationError {
    #[error("lambda must be >= 0, got {0}")]
    InvalidLambda(f32),

    #[error("alpha must be >= 0, got {0}")]
    InvalidAlpha(f32),

    #[error("min_child_weight must be >= 0, got {0}")]
    InvalidMinChildWeight(f32),

    #[error("min_gain must be >= 0, got {0}")]
    InvalidMinGain(f32),

    #[error("max_depth must be in 1..={MAX_TREE_DEPTH}, got {0}")]
    InvalidMaxDepth(u32),

    #[error("max_leaves must be >= 2, got {0}")]
    InvalidMaxLeaves(u32),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_params_default() {
        let params = TreeParams::default();
        assert_eq!(params.growth_strategy, GrowthStrategy::DepthWise { max_depth: 6 });
        assert_eq!(params.max_onehot_cats, 4);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn tree_params_accessors() {
        let depth = TreeParams::depth_wise(10);
        assert_eq!(depth.max_depth(), Some(10));
        assert_eq!(depth.max_leaves(), None);

        let leaves = TreeParams::leaf_wise(63).with_max_onehot_cats(8);
        assert_eq!(leaves.max_depth(), None);
        assert_eq!(leaves.max_leaves(), Some(63));
        assert_eq!(leaves.max_onehot_cats, 8);
    }

    #[test]
    fn tree_params_validation() {
        assert_eq!(
            TreeParams::depth_wise(0).validate(),
            Err(ParamValidationError::InvalidMaxDepth(0))
        );
        assert_eq!(
            TreeParams::depth_wise(17).validate(),
            Err(ParamValidationError::InvalidMaxDepth(17))
        );
        assert_eq!(
            TreeParams::leaf_wise(1).validate(),
            Err(ParamValidationError::InvalidMaxLeaves(1))
        );
    }

    #[test]
    fn regularization_params_validation() {
        assert!(RegularizationParams::default().validate().is_ok());

        let invalid_lambda = RegularizationParams { lambda: -1.0, ..Default::default() };
        assert!(matches!(invalid_lambda.validate(), Err(ParamValidationError::InvalidLambda(_))));

        let nan_alpha = RegularizationParams { alpha: f32::NAN, ..Default::default() };
        assert!(matches!(nan_alpha.validate(), Err(ParamValidationError::InvalidAlpha(_))));
    }

    #[test]
    fn regularization_maps_to_gain_params() {
        let params = RegularizationParams { lambda: 2.0, min_samples_leaf: 3, ..Default::default() };
        let gain = params.to_gain_params();
        assert_eq!(gain.reg_lambda, 2.0);
        assert_eq!(gain.min_samples_leaf, 3);
    }
}
