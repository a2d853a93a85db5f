//! Tree grower for gradient boosting.
//!
//! Orchestrates tree training using histogram-based split finding, row
//! partitioning, and the subtraction trick: only the smaller child's
//! histogram is built from rows, the larger one is `parent - smaller`.

use crate::data::BinnedDataset;
use crate::repr::gbdt::{MutableTree, NodeId, Tree};
use crate::training::Gradients;
use crate::utils::Parallelism;

use super::histogram::{BinStats, Histogram, HistogramLayout};
use super::partition::{LeafId, RowPartitioner};
use super::split::{GainParams, GreedySplitter, SplitInfo, SplitType};

// =============================================================================
// GrowthStrategy
// =============================================================================

/// How a tree is expanded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthStrategy {
    /// Expand every node of a level before the next (XGBoost style).
    DepthWise {
        max_depth: u32,
    },
    /// Always expand the leaf with the highest gain (LightGBM style).
    LeafWise {
        max_leaves: u32,
    },
}

impl Default for GrowthStrategy {
    fn default() -> Self {
        Self::depth_wise()
    }
}

impl GrowthStrategy {
    /// Depth-wise growth with `max_depth = 6`.
    pub fn depth_wise() -> Self {
        Self::DepthWise { max_depth: 6 }
    }

    /// Leaf-wise growth with `max_leaves = 31`.
    pub fn leaf_wise() -> Self {
        Self::LeafWise { max_leaves: 31 }
    }

    /// Upper bound on leaves per tree.
    pub fn max_leaves(&self) -> usize {
        match *self {
            Self::DepthWise { max_depth } => 1usize << max_depth.min(20),
            Self::LeafWise { max_leaves } => max_leaves.max(1) as usize,
        }
    }

    /// Whether a node at `depth` may still be split.
    fn can_split_at(&self, depth: u32) -> bool {
        match *self {
            Self::DepthWise { max_depth } => depth < max_depth,
            Self::LeafWise { .. } => true,
        }
    }
}

// =============================================================================
// GrowerParams
// =============================================================================

/// Parameters for tree growth.
#[derive(Clone, Debug)]
pub struct GrowerParams {
    pub gain: GainParams,
    pub learning_rate: f32,
    pub growth_strategy: GrowthStrategy,
    /// Categorical features with at most this many categories use one-vs-rest splits.
    pub max_onehot_cats: u32,
}

impl Default for GrowerParams {
    fn default() -> Self {
        Self {
            gain: GainParams::default(),
            learning_rate: 0.3,
            growth_strategy: GrowthStrategy::default(),
            max_onehot_cats: 4,
        }
    }
}

/// A leaf waiting to be split or finalized.
#[derive(Debug, Clone)]
struct NodeCandidate {
    leaf: LeafId,
    tree_node: NodeId,
    depth: u32,
    split: SplitInfo,
    stats: BinStats,
}

// =============================================================================
// TreeGrower
// =============================================================================

/// Grows a single regression tree from gradients.
pub struct TreeGrower {
    params: GrowerParams,
    layout: HistogramLayout,
    splitter: GreedySplitter,
    partitioner: RowPartitioner,
    /// Histogram per training leaf, if built.
    histograms: Vec<Option<Histogram>>,
    /// Released histograms for reuse.
    free_histograms: Vec<Histogram>,
    tree: MutableTree,
    /// Leaf values (scaled by learning rate) of the last tree, by training leaf.
    last_leaf_values: Vec<f32>,
    parallelism: Parallelism,
}

impl TreeGrower {
    pub fn new(dataset: &BinnedDataset, params: GrowerParams, parallelism: Parallelism) -> Self {
        let max_leaves = params.growth_strategy.max_leaves();
        let splitter = GreedySplitter::new(params.gain.clone(), params.max_onehot_cats);
        Self {
            layout: HistogramLayout::from_binned(dataset),
            splitter,
            partitioner: RowPartitioner::new(dataset.n_samples(), max_leaves),
            histograms: Vec::new(),
            free_histograms: Vec::new(),
            tree: MutableTree::with_capacity(2 * max_leaves),
            last_leaf_values: Vec::new(),
            params,
            parallelism,
        }
    }

    pub fn params(&self) -> &GrowerParams {
        &self.params
    }

    /// Grow one tree. Leaf values are already scaled by the learning rate.
    pub fn grow(&mut self, dataset: &BinnedDataset, gradients: &Gradients) -> Tree {
        let n_samples = dataset.n_samples();
        debug_assert_eq!(gradients.n_samples(), n_samples);

        self.reset(n_samples);
        let root_node = self.tree.init_root();

        let (grad_sum, hess_sum) = gradients.sum();
        let root_stats = BinStats::new(grad_sum, hess_sum, n_samples as u32);
        self.build_histogram(0, dataset, gradients);
        let root_split = self.find_split(0, dataset, &root_stats);

        let root = NodeCandidate {
            leaf: 0,
            tree_node: root_node,
            depth: 0,
            split: root_split,
            stats: root_stats,
        };

        match self.params.growth_strategy {
            GrowthStrategy::DepthWise { .. } => self.grow_depth_wise(root, dataset, gradients),
            GrowthStrategy::LeafWise { max_leaves } => {
                self.grow_leaf_wise(root, max_leaves as usize, dataset, gradients)
            }
        }

        self.tree.apply_learning_rate(self.params.learning_rate);
        std::mem::take(&mut self.tree).freeze()
    }

    fn grow_depth_wise(&mut self, root: NodeCandidate, dataset: &BinnedDataset, gradients: &Gradients) {
        let mut level = vec![root];
        while !level.is_empty() {
            let mut next_level = Vec::with_capacity(level.len() * 2);
            for candidate in level {
                if candidate.split.is_valid() {
                    let (left, right) = self.split_candidate(candidate, dataset, gradients);
                    next_level.push(left);
                    next_level.push(right);
                } else {
                    self.finalize_leaf(&candidate);
                }
            }
            level = next_level;
        }
    }

    fn grow_leaf_wise(
        &mut self,
        root: NodeCandidate,
        max_leaves: usize,
        dataset: &BinnedDataset,
        gradients: &Gradients,
    ) {
        let mut open = vec![root];
        let mut n_leaves = 1;

        while n_leaves < max_leaves {
            // Highest gain; ties go to the earlier leaf.
            let mut best: Option<usize> = None;
            for (idx, candidate) in open.iter().enumerate() {
                if candidate.split.is_valid()
                    && best.is_none_or(|b| candidate.split.gain > open[b].split.gain)
                {
                    best = Some(idx);
                }
            }
            let Some(best) = best else {
                break;
            };

            let candidate = open.remove(best);
            let (left, right) = self.split_candidate(candidate, dataset, gradients);
            open.push(left);
            open.push(right);
            n_leaves += 1;
        }

        for candidate in &open {
            self.finalize_leaf(candidate);
        }
    }

    /// Apply a candidate's split and prepare both children.
    fn split_candidate(
        &mut self,
        candidate: NodeCandidate,
        dataset: &BinnedDataset,
        gradients: &Gradients,
    ) -> (NodeCandidate, NodeCandidate) {
        let (left_tree, right_tree) = self.apply_split_to_tree(candidate.tree_node, &candidate.split, dataset);
        self.tree
            .set_stats(candidate.tree_node, candidate.split.gain, candidate.stats.hess as f32);

        let (right_leaf, left_count, right_count) =
            self.partitioner.split(candidate.leaf, &candidate.split, dataset);
        let left_leaf = candidate.leaf;
        let depth = candidate.depth + 1;

        let (left_stats, right_stats) = if self.may_split(depth) {
            let (small, large) = if left_count <= right_count {
                (left_leaf, right_leaf)
            } else {
                (right_leaf, left_leaf)
            };
            let small_stats = self.build_children_histograms(left_leaf, small, large, dataset, gradients);
            let large_stats = candidate.stats.minus(&small_stats);
            if small == left_leaf {
                (small_stats, large_stats)
            } else {
                (large_stats, small_stats)
            }
        } else {
            // Children will be leaves: skip histograms.
            self.release_histogram(left_leaf);
            (
                self.row_stats(left_leaf, gradients),
                self.row_stats(right_leaf, gradients),
            )
        };

        let left_split = self.child_split(left_leaf, depth, dataset, &left_stats);
        let right_split = self.child_split(right_leaf, depth, dataset, &right_stats);

        (
            NodeCandidate {
                leaf: left_leaf,
                tree_node: left_tree,
                depth,
                split: left_split,
                stats: left_stats,
            },
            NodeCandidate {
                leaf: right_leaf,
                tree_node: right_tree,
                depth,
                split: right_split,
                stats: right_stats,
            },
        )
    }

    /// Build the smaller child's histogram and derive the larger one.
    ///
    /// The parent histogram sits in `parent` (which is also the left child's
    /// leaf id). Returns the smaller child's totals.
    fn build_children_histograms(
        &mut self,
        parent: LeafId,
        small: LeafId,
        large: LeafId,
        dataset: &BinnedDataset,
        gradients: &Gradients,
    ) -> BinStats {
        let parent_hist = self.take_histogram(parent);
        self.build_histogram(small, dataset, gradients);
        let small_totals = self
            .histogram(small)
            .map_or_else(|| self.row_stats(small, gradients), |h| h.totals(&self.layout));

        match parent_hist {
            Some(mut parent_hist) => {
                if let Some(small_hist) = self.histogram(small) {
                    parent_hist.subtract(small_hist);
                }
                self.store_histogram(large, parent_hist);
            }
            None => self.build_histogram(large, dataset, gradients),
        }

        small_totals
    }

    fn may_split(&self, depth: u32) -> bool {
        self.params.growth_strategy.can_split_at(depth)
    }

    fn child_split(&mut self, leaf: LeafId, depth: u32, dataset: &BinnedDataset, stats: &BinStats) -> SplitInfo {
        if self.may_split(depth) {
            self.find_split(leaf, dataset, stats)
        } else {
            SplitInfo::invalid()
        }
    }

    fn find_split(&self, leaf: LeafId, dataset: &BinnedDataset, stats: &BinStats) -> SplitInfo {
        match self.histogram(leaf) {
            Some(hist) => self
                .splitter
                .find_split(hist, &self.layout, dataset, stats, self.parallelism),
            None => SplitInfo::invalid(),
        }
    }

    /// Turn a candidate into a leaf and record its value.
    fn finalize_leaf(&mut self, candidate: &NodeCandidate) {
        let weight = self
            .splitter
            .compute_leaf_weight(candidate.stats.grad, candidate.stats.hess);
        self.tree.make_leaf(candidate.tree_node, weight);
        self.tree
            .set_stats(candidate.tree_node, 0.0, candidate.stats.hess as f32);

        let idx = candidate.leaf as usize;
        if idx >= self.last_leaf_values.len() {
            self.last_leaf_values.resize(idx + 1, f32::NAN);
        }
        self.last_leaf_values[idx] = weight * self.params.learning_rate;
        self.release_histogram(candidate.leaf);
    }

    /// Add the last tree's leaf values to `predictions` using the final row
    /// partition, instead of traversing the tree per row.
    pub fn update_predictions_from_last_tree(&self, predictions: &mut [f32]) {
        let indices = self.partitioner.indices();
        for (leaf, &value) in self.last_leaf_values.iter().enumerate() {
            if value.is_nan() || leaf >= self.partitioner.n_leaves() {
                continue;
            }
            let (begin, end) = self.partitioner.leaf_range(leaf as LeafId);
            for &row in &indices[begin..end] {
                predictions[row as usize] += value;
            }
        }
    }

    /// Translate a bin-space split into a raw-value split on the tree.
    ///
    /// Numeric: bins `1..=b` go left, i.e. values `<= bin_upper_bound(b)`.
    /// Categorical: bin `k + 1` holds category `k`, so `left_cats` already
    /// hold category ids.
    fn apply_split_to_tree(&mut self, node: NodeId, split: &SplitInfo, dataset: &BinnedDataset) -> (NodeId, NodeId) {
        match &split.split_type {
            SplitType::Numerical { bin } => {
                let threshold = dataset.mapper(split.feature as usize).bin_upper_bound(*bin);
                self.tree
                    .apply_numeric_split(node, split.feature, threshold, split.default_left)
            }
            SplitType::Categorical { left_cats } => {
                self.tree
                    .apply_categorical_split(node, split.feature, left_cats, split.default_left)
            }
        }
    }

    fn reset(&mut self, n_samples: usize) {
        self.partitioner.reset(n_samples);
        for slot in 0..self.histograms.len() {
            self.release_histogram(slot as LeafId);
        }
        self.last_leaf_values.fill(f32::NAN);
    }

    fn build_histogram(&mut self, leaf: LeafId, dataset: &BinnedDataset, gradients: &Gradients) {
        let mut hist = match self.free_histograms.pop() {
            Some(mut h) => {
                h.clear();
                h
            }
            None => Histogram::new(&self.layout),
        };
        hist.build(
            &self.layout,
            dataset,
            gradients,
            self.partitioner.leaf_indices(leaf),
            self.parallelism,
        );
        self.store_histogram(leaf, hist);
    }

    fn histogram(&self, leaf: LeafId) -> Option<&Histogram> {
        self.histograms.get(leaf as usize).and_then(Option::as_ref)
    }

    fn take_histogram(&mut self, leaf: LeafId) -> Option<Histogram> {
        self.histograms.get_mut(leaf as usize).and_then(Option::take)
    }

    fn store_histogram(&mut self, leaf: LeafId, hist: Histogram) {
        let idx = leaf as usize;
        if idx >= self.histograms.len() {
            self.histograms.resize_with(idx + 1, || None);
        }
        if let Some(old) = self.histograms[idx].replace(hist) {
            self.free_histograms.push(old);
        }
    }

    fn release_histogram(&mut self, leaf: LeafId) {
        if let Some(hist) = self.take_histogram(leaf) {
            self.free_histograms.push(hist);
        }
    }

    /// Gradient totals of a leaf computed from its rows.
    fn row_stats(&self, leaf: LeafId, gradients: &Gradients) -> BinStats {
        let mut stats = BinStats::default();
        for &row in self.partitioner.leaf_indices(leaf) {
            let (g, h) = gradients.get(row as usize);
            stats.add_sample(g, h);
        }
        stats
    }
}
