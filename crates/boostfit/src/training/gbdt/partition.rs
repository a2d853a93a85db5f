//! Row partitioning for tree training.
//!
//! Row indices live in one contiguous buffer; every training leaf owns a
//! range of it. Splitting a leaf partitions its range in place: the leaf keeps
//! the left rows and a new leaf takes the right rows.
//!
//! ```text
//! Initial (all rows in leaf 0):
//!   indices: [0, 1, 2, 3, 4, 5, 6, 7]
//!   leaf_begin: [0], leaf_count: [8]
//!
//! After splitting leaf 0 (even rows left, odd rows right):
//!   indices: [0, 2, 4, 6, 1, 3, 5, 7]
//!   leaf_begin: [0, 4], leaf_count: [4, 4]
//! ```

use super::split::SplitInfo;
use crate::data::BinnedDataset;

/// Leaf identifier during training.
pub type LeafId = u32;

/// Manages row indices per leaf during tree training.
#[derive(Debug, Clone)]
pub struct RowPartitioner {
    indices: Box<[u32]>,
    leaf_begin: Vec<u32>,
    leaf_count: Vec<u32>,
    /// Scratch buffer for right-going rows.
    scratch: Vec<u32>,
}

impl RowPartitioner {
    pub fn new(n_samples: usize, max_leaves: usize) -> Self {
        Self {
            indices: (0..n_samples as u32).collect(),
            leaf_begin: Vec::with_capacity(max_leaves),
            leaf_count: Vec::with_capacity(max_leaves),
            scratch: Vec::new(),
        }
    }

    /// Put every row back into leaf 0.
    pub fn reset(&mut self, n_samples: usize) {
        if self.indices.len() != n_samples {
            self.indices = (0..n_samples as u32).collect();
        } else {
            for (i, idx) in self.indices.iter_mut().enumerate() {
                *idx = i as u32;
            }
        }
        self.leaf_begin.clear();
        self.leaf_count.clear();
        self.leaf_begin.push(0);
        self.leaf_count.push(n_samples as u32);
    }

    /// Row indices of a leaf.
    #[inline]
    pub fn leaf_indices(&self, leaf: LeafId) -> &[u32] {
        let (begin, end) = self.leaf_range(leaf);
        &self.indices[begin..end]
    }

    #[inline]
    pub fn leaf_count(&self, leaf: LeafId) -> u32 {
        self.leaf_count[leaf as usize]
    }

    /// `(begin, end)` of a leaf in [`indices`](Self::indices).
    #[inline]
    pub fn leaf_range(&self, leaf: LeafId) -> (usize, usize) {
        let begin = self.leaf_begin[leaf as usize] as usize;
        (begin, begin + self.leaf_count[leaf as usize] as usize)
    }

    #[inline]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[inline]
    pub fn n_leaves(&self) -> usize {
        self.leaf_begin.len()
    }

    /// Split a leaf.
    ///
    /// The original leaf keeps the left-going rows and a new leaf is allocated
    /// for the right-going rows. Relative row order is preserved on both sides.
    ///
    /// Returns `(right_leaf, left_count, right_count)`.
    pub fn split(&mut self, leaf: LeafId, split: &SplitInfo, dataset: &BinnedDataset) -> (LeafId, u32, u32) {
        let (begin, end) = self.leaf_range(leaf);
        let bins = dataset.feature_bins(split.feature as usize);

        self.scratch.clear();
        let mut left_end = begin;
        for i in begin..end {
            let row = self.indices[i];
            if split.goes_left(bins[row as usize]) {
                self.indices[left_end] = row;
                left_end += 1;
            } else {
                self.scratch.push(row);
            }
        }
        self.indices[left_end..end].copy_from_slice(&self.scratch);

        let left_count = (left_end - begin) as u32;
        let right_count = (end - left_end) as u32;

        self.leaf_count[leaf as usize] = left_count;
        let right_leaf = self.leaf_begin.len() as LeafId;
        self.leaf_begin.push(left_end as u32);
        self.leaf_count.push(right_count);

        (right_leaf, left_count, right_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::utils::Parallelism;

    fn make_binned() -> BinnedDataset {
        // Feature 0 alternates, feature 1 is 0 for the first half.
        let dataset = Dataset::builder()
            .add_feature("f0", vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0])
            .add_feature("f1", vec![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0])
            .build()
            .unwrap();
        BinnedDataset::from_dataset(&dataset, 254, Parallelism::Sequential)
    }

    #[test]
    fn reset_puts_all_rows_in_root() {
        let mut partitioner = RowPartitioner::new(100, 16);
        partitioner.reset(100);

        assert_eq!(partitioner.leaf_count(0), 100);
        assert_eq!(partitioner.n_leaves(), 1);
        assert!(partitioner.leaf_indices(0).iter().enumerate().all(|(i, &r)| r == i as u32));
    }

    #[test]
    fn split_keeps_order() {
        let dataset = make_binned();
        let mut partitioner = RowPartitioner::new(8, 16);
        partitioner.reset(8);

        // Value bin 1 (value 0.0) goes left.
        let split = SplitInfo::numerical(0, 1, 1.0, false);
        let (right_leaf, left_count, right_count) = partitioner.split(0, &split, &dataset);

        assert_eq!((right_leaf, left_count, right_count), (1, 4, 4));
        assert_eq!(partitioner.leaf_indices(0), &[0, 2, 4, 6]);
        assert_eq!(partitioner.leaf_indices(1), &[1, 3, 5, 7]);
    }

    #[test]
    fn nested_splits() {
        let dataset = make_binned();
        let mut partitioner = RowPartitioner::new(8, 16);
        partitioner.reset(8);

        let (leaf1, _, _) = partitioner.split(0, &SplitInfo::numerical(1, 1, 1.0, false), &dataset);
        let (leaf2, left_count, right_count) =
            partitioner.split(0, &SplitInfo::numerical(0, 1, 1.0, false), &dataset);

        assert_eq!((left_count, right_count), (2, 2));
        assert_eq!(partitioner.leaf_indices(0), &[0, 2]);
        assert_eq!(partitioner.leaf_indices(leaf2), &[1, 3]);
        assert_eq!(partitioner.leaf_indices(leaf1), &[4, 5, 6, 7]);
        assert_eq!(partitioner.n_leaves(), 3);
    }
}
