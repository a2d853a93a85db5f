//! Canonical tree representation (SoA).
//!
//! For mutable tree construction during training, see
//! [`super::mutable_tree::MutableTree`].

// Allow many constructor arguments for creating trees with all their fields.
#![allow(clippy::too_many_arguments)]

use rayon::prelude::*;

use crate::data::Dataset;
use crate::utils::Parallelism;

use super::NodeId;
use super::categories::{CategoriesStorage, float_to_category};
use super::node::SplitType;

// ============================================================================
// TreeValidationError
// ============================================================================

/// Structural validation errors for [`Tree`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeValidationError {
    #[error("tree has no nodes")]
    EmptyTree,
    #[error("node {node} has {side} child {child} out of bounds ({n_nodes} nodes)")]
    ChildOutOfBounds {
        node: NodeId,
        side: &'static str,
        child: NodeId,
        n_nodes: usize,
    },
    #[error("node {node} references itself")]
    SelfLoop { node: NodeId },
    #[error("node {node} reached by more than one path")]
    DuplicateVisit { node: NodeId },
    #[error("cycle detected at node {node}")]
    CycleDetected { node: NodeId },
    #[error("node {node} is unreachable from the root")]
    UnreachableNode { node: NodeId },
    #[error("categorical segments ({segments_len}) not sized to nodes ({n_nodes})")]
    CategoricalSegmentsLenMismatch { segments_len: usize, n_nodes: usize },
    #[error("array {field} has length {len}, expected {n_nodes}")]
    ArrayLenMismatch {
        field: &'static str,
        len: usize,
        n_nodes: usize,
    },
}

// ============================================================================
// Tree
// ============================================================================

/// Structure-of-Arrays tree storage for efficient traversal.
///
/// Stores tree nodes in flat arrays for cache-friendly traversal.
/// Child indices are local to this tree (0 = root).
#[derive(Debug, Clone, PartialEq)]
pub struct Tree {
    split_indices: Box<[u32]>,
    split_thresholds: Box<[f32]>,
    left_children: Box<[u32]>,
    right_children: Box<[u32]>,
    default_left: Box<[bool]>,
    is_leaf: Box<[bool]>,
    leaf_values: Box<[f32]>,
    split_types: Box<[SplitType]>,
    categories: CategoriesStorage,
    /// Gain at each split node (0 for leaves).
    gains: Box<[f32]>,
    /// Hessian sum of the training rows reaching each node.
    covers: Box<[f32]>,
}

impl Tree {
    /// Create a tree from parallel arrays.
    ///
    /// Array lengths are checked by [`Tree::validate`], not here.
    pub fn new(
        split_indices: Vec<u32>,
        split_thresholds: Vec<f32>,
        left_children: Vec<u32>,
        right_children: Vec<u32>,
        default_left: Vec<bool>,
        is_leaf: Vec<bool>,
        leaf_values: Vec<f32>,
        split_types: Vec<SplitType>,
        categories: CategoriesStorage,
    ) -> Self {
        let n_nodes = is_leaf.len();
        Self {
            split_indices: split_indices.into_boxed_slice(),
            split_thresholds: split_thresholds.into_boxed_slice(),
            left_children: left_children.into_boxed_slice(),
            right_children: right_children.into_boxed_slice(),
            default_left: default_left.into_boxed_slice(),
            is_leaf: is_leaf.into_boxed_slice(),
            leaf_values: leaf_values.into_boxed_slice(),
            split_types: split_types.into_boxed_slice(),
            categories,
            gains: vec![0.0; n_nodes].into_boxed_slice(),
            covers: vec![0.0; n_nodes].into_boxed_slice(),
        }
    }

    /// A single-leaf tree.
    pub fn leaf(value: f32) -> Self {
        Self::new(
            vec![0],
            vec![0.0],
            vec![0],
            vec![0],
            vec![false],
            vec![true],
            vec![value],
            vec![SplitType::Numeric],
            CategoriesStorage::empty(),
        )
    }

    /// Set gains and covers.
    pub fn with_stats(mut self, gains: Vec<f32>, covers: Vec<f32>) -> Self {
        self.gains = gains.into_boxed_slice();
        self.covers = covers.into_boxed_slice();
        self
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.is_leaf.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.is_leaf.iter().filter(|&&l| l).count()
    }

    #[inline]
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.is_leaf[node as usize]
    }

    #[inline]
    pub fn split_index(&self, node: NodeId) -> u32 {
        self.split_indices[node as usize]
    }

    #[inline]
    pub fn split_threshold(&self, node: NodeId) -> f32 {
        self.split_thresholds[node as usize]
    }

    #[inline]
    pub fn left_child(&self, node: NodeId) -> NodeId {
        self.left_children[node as usize]
    }

    #[inline]
    pub fn right_child(&self, node: NodeId) -> NodeId {
        self.right_children[node as usize]
    }

    #[inline]
    pub fn default_left(&self, node: NodeId) -> bool {
        self.default_left[node as usize]
    }

    #[inline]
    pub fn split_type(&self, node: NodeId) -> SplitType {
        self.split_types[node as usize]
    }

    #[inline]
    pub fn categories(&self) -> &CategoriesStorage {
        &self.categories
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.leaf_values[node as usize]
    }

    pub fn has_categorical(&self) -> bool {
        self.split_types
            .iter()
            .any(|t| matches!(t, SplitType::Categorical))
    }

    pub fn gains(&self) -> &[f32] {
        &self.gains
    }

    pub fn covers(&self) -> &[f32] {
        &self.covers
    }

    pub fn split_indices(&self) -> &[u32] {
        &self.split_indices
    }

    pub fn split_thresholds(&self) -> &[f32] {
        &self.split_thresholds
    }

    pub fn left_children(&self) -> &[u32] {
        &self.left_children
    }

    pub fn right_children(&self) -> &[u32] {
        &self.right_children
    }

    pub fn default_lefts(&self) -> &[bool] {
        &self.default_left
    }

    pub fn leaf_flags(&self) -> &[bool] {
        &self.is_leaf
    }

    pub fn leaf_values(&self) -> &[f32] {
        &self.leaf_values
    }

    pub fn split_types(&self) -> &[SplitType] {
        &self.split_types
    }

    // =========================================================================
    // Traversal
    // =========================================================================

    /// Walk from the root to a leaf, reading feature values through `feature`.
    ///
    /// NaN follows the default direction. Categorical values that are not
    /// valid ids go right unless NaN.
    #[inline]
    pub fn traverse_to_leaf<F: Fn(usize) -> f32>(&self, feature: F) -> NodeId {
        let mut node: NodeId = 0;

        while !self.is_leaf(node) {
            let fvalue = feature(self.split_index(node) as usize);

            let go_left = if fvalue.is_nan() {
                self.default_left(node)
            } else {
                match self.split_type(node) {
                    SplitType::Numeric => fvalue <= self.split_threshold(node),
                    SplitType::Categorical => float_to_category(fvalue)
                        .is_some_and(|c| self.categories.category_goes_left(node, c)),
                }
            };

            node = if go_left {
                self.left_child(node)
            } else {
                self.right_child(node)
            };
        }

        node
    }

    /// Leaf value for one sample's features.
    pub fn predict_row(&self, features: &[f32]) -> f32 {
        let leaf = self.traverse_to_leaf(|f| features.get(f).copied().unwrap_or(f32::NAN));
        self.leaf_value(leaf)
    }

    /// **Add** this tree's output for every sample of `dataset` into `predictions`.
    pub fn predict_into(&self, dataset: &Dataset, predictions: &mut [f32], parallelism: Parallelism) {
        debug_assert_eq!(predictions.len(), dataset.n_samples());

        let predict = |(row, pred): (usize, &mut f32)| {
            let leaf = self.traverse_to_leaf(|f| dataset.get_feature_value(f, row));
            *pred += self.leaf_value(leaf);
        };

        if parallelism.is_parallel() {
            predictions.par_iter_mut().enumerate().for_each(predict);
        } else {
            predictions.iter_mut().enumerate().for_each(predict);
        }
    }

    // =========================================================================
    // Validation
    // =========================================================================

    /// Validate structural invariants for this tree.
    pub fn validate(&self) -> Result<(), TreeValidationError> {
        let n_nodes = self.n_nodes();
        if n_nodes == 0 {
            return Err(TreeValidationError::EmptyTree);
        }

        for (field, len) in [
            ("split_indices", self.split_indices.len()),
            ("split_thresholds", self.split_thresholds.len()),
            ("left_children", self.left_children.len()),
            ("right_children", self.right_children.len()),
            ("default_left", self.default_left.len()),
            ("leaf_values", self.leaf_values.len()),
            ("split_types", self.split_types.len()),
            ("gains", self.gains.len()),
            ("covers", self.covers.len()),
        ] {
            if len != n_nodes {
                return Err(TreeValidationError::ArrayLenMismatch { field, len, n_nodes });
            }
        }

        if self.has_categorical() {
            let segments_len = self.categories.segments().len();
            if segments_len != n_nodes {
                return Err(TreeValidationError::CategoricalSegmentsLenMismatch {
                    segments_len,
                    n_nodes,
                });
            }
        }

        // Iterative DFS with color marking.
        // 0 = unvisited, 1 = visiting, 2 = done
        let mut color = vec![0u8; n_nodes];
        let mut stack: Vec<(NodeId, bool)> = vec![(0, false)];

        while let Some((node, finished)) = stack.pop() {
            let idx = node as usize;
            if finished {
                color[idx] = 2;
                continue;
            }

            match color[idx] {
                0 => {}
                1 => return Err(TreeValidationError::CycleDetected { node }),
                _ => return Err(TreeValidationError::DuplicateVisit { node }),
            }
            color[idx] = 1;
            stack.push((node, true));

            if self.is_leaf(node) {
                continue;
            }

            let left = self.left_child(node);
            let right = self.right_child(node);
            if left == node || right == node {
                return Err(TreeValidationError::SelfLoop { node });
            }
            for (side, child) in [("left", left), ("right", right)] {
                if child as usize >= n_nodes {
                    return Err(TreeValidationError::ChildOutOfBounds {
                        node,
                        side,
                        child,
                        n_nodes,
                    });
                }
            }

            stack.push((right, false));
            stack.push((left, false));
        }

        if let Some(node) = color.iter().position(|&c| c == 0) {
            return Err(TreeValidationError::UnreachableNode { node: node as u32 });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repr::gbdt::MutableTree;
    use ndarray::array;

    fn stump(threshold: f32, left: f32, right: f32, default_left: bool) -> Tree {
        let mut tree = MutableTree::new();
        let root = tree.init_root();
        let (l, r) = tree.apply_numeric_split(root, 0, threshold, default_left);
        tree.make_leaf(l, left);
        tree.make_leaf(r, right);
        tree.freeze()
    }

    #[test]
    fn predict_simple_tree() {
        let tree = stump(0.5, 1.0, 2.0, true);
        assert_eq!(tree.predict_row(&[0.3]), 1.0);
        assert_eq!(tree.predict_row(&[0.5]), 1.0);
        assert_eq!(tree.predict_row(&[0.7]), 2.0);
        assert_eq!(tree.predict_row(&[f32::NAN]), 1.0);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn predict_categorical_tree() {
        let mut tree = MutableTree::new();
        let root = tree.init_root();
        let (l, r) = tree.apply_categorical_split(root, 0, &[1, 3], false);
        tree.make_leaf(l, -1.0);
        tree.make_leaf(r, 1.0);
        let tree = tree.freeze();

        assert_eq!(tree.predict_row(&[1.0]), -1.0);
        assert_eq!(tree.predict_row(&[3.0]), -1.0);
        assert_eq!(tree.predict_row(&[0.0]), 1.0);
        // Unknown category goes right, missing follows the default.
        assert_eq!(tree.predict_row(&[42.0]), 1.0);
        assert_eq!(tree.predict_row(&[f32::NAN]), 1.0);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn predict_into_accumulates() {
        let tree = stump(0.5, 1.0, 2.0, false);
        let ds = Dataset::new(array![[0.3, 0.7, f32::NAN]], None).unwrap();

        let mut seq = vec![10.0, 20.0, 30.0];
        tree.predict_into(&ds, &mut seq, Parallelism::Sequential);
        assert_eq!(seq, vec![11.0, 22.0, 32.0]);

        let mut par = vec![10.0, 20.0, 30.0];
        tree.predict_into(&ds, &mut par, Parallelism::Parallel);
        assert_eq!(par, seq);
    }

    #[test]
    fn single_leaf_tree() {
        let tree = Tree::leaf(0.25);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.n_leaves(), 1);
        assert_eq!(tree.predict_row(&[]), 0.25);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn validate_detects_bad_children() {
        let tree = Tree::new(
            vec![0, 0, 0],
            vec![0.5, 0.0, 0.0],
            vec![1, 0, 0],
            vec![5, 0, 0],
            vec![false; 3],
            vec![false, true, true],
            vec![0.0; 3],
            vec![SplitType::Numeric; 3],
            CategoriesStorage::empty(),
        );
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::ChildOutOfBounds { side: "right", child: 5, .. })
        ));

        let tree = Tree::new(
            vec![0, 0, 0],
            vec![0.5, 0.0, 0.0],
            vec![1, 0, 0],
            vec![1, 0, 0],
            vec![false; 3],
            vec![false, true, true],
            vec![0.0; 3],
            vec![SplitType::Numeric; 3],
            CategoriesStorage::empty(),
        );
        assert!(matches!(
            tree.validate(),
            Err(TreeValidationError::DuplicateVisit { node: 1 })
        ));
    }
}
