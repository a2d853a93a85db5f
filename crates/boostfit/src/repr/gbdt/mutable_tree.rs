//! Growable tree used by the grower before freezing into a [`Tree`].

use super::NodeId;
use super::categories::{CategoriesStorage, categories_to_bitset};
use super::node::SplitType;
use super::tree::Tree;

/// One node under construction. New nodes start as zero-valued leaves.
#[derive(Debug, Clone, Default)]
struct PendingNode {
    feature: u32,
    threshold: f32,
    children: Option<(NodeId, NodeId)>,
    default_left: bool,
    split_type: SplitType,
    value: f32,
    gain: f32,
    cover: f32,
    /// Left-set bitset of a categorical split.
    left_set: Option<Vec<u32>>,
}

/// Tree under construction.
///
/// Nodes are allocated in pairs as splits are applied; node ids are
/// allocation order, so the root is always `0`.
#[derive(Debug, Clone, Default)]
pub struct MutableTree {
    nodes: Vec<PendingNode>,
}

impl MutableTree {
    pub fn new() -> Self {
        Self::with_capacity(64)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
        }
    }

    /// Drop all nodes and allocate a fresh root leaf.
    pub fn init_root(&mut self) -> NodeId {
        self.reset();
        self.push_node()
    }

    /// Split `node` on `value <= threshold`; returns `(left, right)`.
    pub fn apply_numeric_split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
    ) -> (NodeId, NodeId) {
        self.split(node, feature, threshold, default_left, SplitType::Numeric, None)
    }

    /// Split `node` sending `left_categories` left and every other category right.
    pub fn apply_categorical_split(
        &mut self,
        node: NodeId,
        feature: u32,
        left_categories: &[u32],
        default_left: bool,
    ) -> (NodeId, NodeId) {
        let bitset = categories_to_bitset(left_categories);
        self.split(node, feature, 0.0, default_left, SplitType::Categorical, Some(bitset))
    }

    fn split(
        &mut self,
        node: NodeId,
        feature: u32,
        threshold: f32,
        default_left: bool,
        split_type: SplitType,
        left_set: Option<Vec<u32>>,
    ) -> (NodeId, NodeId) {
        let children = (self.push_node(), self.push_node());
        let target = &mut self.nodes[node as usize];
        target.feature = feature;
        target.threshold = threshold;
        target.default_left = default_left;
        target.split_type = split_type;
        target.left_set = left_set;
        target.children = Some(children);
        children
    }

    pub fn make_leaf(&mut self, node: NodeId, value: f32) {
        let target = &mut self.nodes[node as usize];
        target.children = None;
        target.value = value;
    }

    /// Record split gain and hessian cover.
    pub fn set_stats(&mut self, node: NodeId, gain: f32, cover: f32) {
        let target = &mut self.nodes[node as usize];
        target.gain = gain;
        target.cover = cover;
    }

    /// Multiply every leaf value by the shrinkage factor.
    pub fn apply_learning_rate(&mut self, learning_rate: f32) {
        self.nodes
            .iter_mut()
            .filter(|n| n.children.is_none())
            .for_each(|n| n.value *= learning_rate);
    }

    #[inline]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn leaf_value(&self, node: NodeId) -> f32 {
        self.nodes[node as usize].value
    }

    pub fn reset(&mut self) {
        self.nodes.clear();
    }

    /// Convert into the immutable structure-of-arrays [`Tree`].
    pub fn freeze(self) -> Tree {
        let n = self.nodes.len();
        let mut split_indices = Vec::with_capacity(n);
        let mut thresholds = Vec::with_capacity(n);
        let mut lefts = Vec::with_capacity(n);
        let mut rights = Vec::with_capacity(n);
        let mut default_left = Vec::with_capacity(n);
        let mut is_leaf = Vec::with_capacity(n);
        let mut values = Vec::with_capacity(n);
        let mut split_types = Vec::with_capacity(n);
        let mut gains = Vec::with_capacity(n);
        let mut covers = Vec::with_capacity(n);

        let mut bitsets = Vec::new();
        let mut segments = vec![(0u32, 0u32); n];
        let mut any_categorical = false;

        for (idx, node) in self.nodes.into_iter().enumerate() {
            let (left, right) = node.children.unwrap_or((0, 0));
            split_indices.push(node.feature);
            thresholds.push(node.threshold);
            lefts.push(left);
            rights.push(right);
            default_left.push(node.default_left);
            is_leaf.push(node.children.is_none());
            values.push(if node.children.is_none() { node.value } else { 0.0 });
            split_types.push(node.split_type);
            gains.push(node.gain);
            covers.push(node.cover);

            if let Some(set) = node.left_set {
                any_categorical = true;
                segments[idx] = (bitsets.len() as u32, set.len() as u32);
                bitsets.extend(set);
            }
        }

        let categories = if any_categorical {
            CategoriesStorage::new(bitsets, segments)
        } else {
            CategoriesStorage::empty()
        };

        Tree::new(
            split_indices,
            thresholds,
            lefts,
            rights,
            default_left,
            is_leaf,
            values,
            split_types,
            categories,
        )
        .with_stats(gains, covers)
    }

    fn push_node(&mut self) -> NodeId {
        self.nodes.push(PendingNode::default());
        (self.nodes.len() - 1) as NodeId
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn freeze_preserves_structure() {
        let mut tree = MutableTree::new();
        let root = tree.init_root();
        let (l, r) = tree.apply_numeric_split(root, 2, 1.5, true);
        let (rl, rr) = tree.apply_categorical_split(r, 0, &[0, 2], false);
        tree.make_leaf(l, 1.0);
        tree.make_leaf(rl, 2.0);
        tree.make_leaf(rr, 3.0);
        tree.set_stats(root, 4.0, 10.0);
        tree.apply_learning_rate(0.5);
        assert_eq!(tree.n_nodes(), 5);
        assert_eq!(tree.leaf_value(rr), 1.5);

        let frozen = tree.freeze();
        assert!(frozen.validate().is_ok());
        assert_eq!(frozen.n_leaves(), 3);
        assert_eq!(frozen.gains()[0], 4.0);
        assert_eq!(frozen.covers()[0], 10.0);
        assert!(frozen.categories().category_goes_left(r, 2));
        assert!(!frozen.categories().category_goes_left(r, 1));

        // Numeric feature 2 <= 1.5 goes left; category 0 of feature 0 is in the left set.
        assert_eq!(frozen.predict_row(&[2.0, 0.0, 1.0]), 0.5);
        assert_eq!(frozen.predict_row(&[2.0, 0.0, 3.0]), 1.0);
        assert_eq!(frozen.predict_row(&[1.0, 0.0, 3.0]), 1.5);
    }

    #[test]
    fn numeric_only_tree_has_no_category_storage() {
        let mut tree = MutableTree::new();
        let root = tree.init_root();
        let (l, r) = tree.apply_numeric_split(root, 0, 0.0, false);
        tree.make_leaf(l, -1.0);
        tree.make_leaf(r, 1.0);
        assert!(tree.freeze().categories().is_empty());
    }

    #[test]
    fn init_root_discards_previous_nodes() {
        let mut tree = MutableTree::new();
        let root = tree.init_root();
        tree.apply_numeric_split(root, 0, 0.0, false);
        assert_eq!(tree.init_root(), 0);
        assert_eq!(tree.n_nodes(), 1);
    }
}
