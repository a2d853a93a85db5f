//! Split finding from gradient histograms.
//!
//! [`GreedySplitter`] scans every feature's histogram and returns the split
//! with the highest gain. Bin `0` of every feature holds missing values; each
//! candidate is scored with missing values sent left and right, and the better
//! direction becomes the split's default.

use crate::data::{BinMapper, BinnedDataset};
use crate::utils::Parallelism;

use super::histogram::{BinStats, Histogram, HistogramLayout};

// =============================================================================
// Gain Parameters
// =============================================================================

/// Parameters for split gain computation and leaf weight calculation.
#[derive(Clone, Debug, PartialEq)]
pub struct GainParams {
    /// L2 regularization (lambda).
    pub reg_lambda: f32,
    /// L1 regularization (alpha).
    pub reg_alpha: f32,
    /// Minimum split gain (gamma).
    pub min_gain: f32,
    /// Minimum sum of hessians per child.
    pub min_child_weight: f32,
    /// Minimum samples per child.
    pub min_samples_leaf: u32,
}

impl Default for GainParams {
    fn default() -> Self {
        Self {
            reg_lambda: 1.0,
            reg_alpha: 0.0,
            min_gain: 0.0,
            min_child_weight: 1.0,
            min_samples_leaf: 1,
        }
    }
}

impl GainParams {
    /// Split gain.
    ///
    /// ```text
    /// gain = 0.5 * [G_L²/(H_L + λ) + G_R²/(H_R + λ) - G_P²/(H_P + λ)] - γ
    /// ```
    #[inline]
    pub fn compute_gain(&self, left: &BinStats, right: &BinStats, parent: &BinStats) -> f32 {
        let gain = 0.5
            * (self.score(left.grad, left.hess) + self.score(right.grad, right.hess)
                - self.score(parent.grad, parent.hess))
            - self.min_gain as f64;
        gain as f32
    }

    /// Structure score `G²/(H + λ)`, with L1 soft thresholding on `G`.
    #[inline]
    fn score(&self, grad: f64, hess: f64) -> f64 {
        let g = soft_threshold(grad, self.reg_alpha as f64);
        g * g / (hess + self.reg_lambda as f64)
    }

    /// Check if a split satisfies the child constraints.
    #[inline]
    pub fn is_valid_split(&self, left: &BinStats, right: &BinStats) -> bool {
        let min_weight = self.min_child_weight as f64;
        let min_samples = self.min_samples_leaf.max(1);

        left.hess >= min_weight
            && right.hess >= min_weight
            && left.count >= min_samples
            && right.count >= min_samples
    }

    /// Leaf weight with L1 and L2 regularization.
    ///
    /// ```text
    /// weight = -sign(G) × max(0, |G| - α) / (H + λ)
    /// ```
    #[inline]
    pub fn compute_leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f32 {
        let denom = hess_sum + self.reg_lambda as f64;
        if denom <= 0.0 {
            return 0.0;
        }
        (-soft_threshold(grad_sum, self.reg_alpha as f64) / denom) as f32
    }
}

#[inline]
fn soft_threshold(grad: f64, alpha: f64) -> f64 {
    if alpha == 0.0 {
        grad
    } else if grad > alpha {
        grad - alpha
    } else if grad < -alpha {
        grad + alpha
    } else {
        0.0
    }
}

// =============================================================================
// SplitInfo
// =============================================================================

/// Split condition in bin space.
#[derive(Clone, Debug, PartialEq)]
pub enum SplitType {
    /// Value bins `1..=bin` go left.
    Numerical { bin: u32 },
    /// Listed category ids go left, sorted ascending.
    Categorical { left_cats: Vec<u32> },
}

/// Best split found for a node.
#[derive(Clone, Debug, PartialEq)]
pub struct SplitInfo {
    pub feature: u32,
    pub gain: f32,
    /// Direction for missing values.
    pub default_left: bool,
    pub split_type: SplitType,
}

impl SplitInfo {
    pub fn numerical(feature: u32, bin: u32, gain: f32, default_left: bool) -> Self {
        Self {
            feature,
            gain,
            default_left,
            split_type: SplitType::Numerical { bin },
        }
    }

    pub fn categorical(feature: u32, left_cats: Vec<u32>, gain: f32, default_left: bool) -> Self {
        Self {
            feature,
            gain,
            default_left,
            split_type: SplitType::Categorical { left_cats },
        }
    }

    /// Placeholder for "no split".
    pub fn invalid() -> Self {
        Self::numerical(0, 0, f32::NEG_INFINITY, false)
    }

    /// Whether this split improves the loss.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.gain.is_finite() && self.gain > 0.0
    }

    /// Whether a binned value goes left.
    #[inline]
    pub fn goes_left(&self, bin: u32) -> bool {
        if bin == 0 {
            return self.default_left;
        }
        match &self.split_type {
            SplitType::Numerical { bin: threshold } => bin <= *threshold,
            SplitType::Categorical { left_cats } => {
                BinMapper::bin_to_category(bin).is_some_and(|c| left_cats.binary_search(&c).is_ok())
            }
        }
    }
}

// =============================================================================
// GreedySplitter
// =============================================================================

/// Exhaustive histogram split search.
#[derive(Clone, Debug)]
pub struct GreedySplitter {
    gain: GainParams,
    max_onehot_cats: u32,
}

impl GreedySplitter {
    pub fn new(gain: GainParams, max_onehot_cats: u32) -> Self {
        Self {
            gain,
            max_onehot_cats,
        }
    }

    pub fn gain_params(&self) -> &GainParams {
        &self.gain
    }

    #[inline]
    pub fn compute_leaf_weight(&self, grad_sum: f64, hess_sum: f64) -> f32 {
        self.gain.compute_leaf_weight(grad_sum, hess_sum)
    }

    /// Best split over all features.
    ///
    /// Features are scored independently; ties keep the lower feature index.
    pub fn find_split(
        &self,
        histogram: &Histogram,
        layout: &HistogramLayout,
        dataset: &BinnedDataset,
        parent: &BinStats,
        parallelism: Parallelism,
    ) -> SplitInfo {
        let candidates = parallelism.maybe_par_map(0..layout.n_features(), |feature| {
            let bins = histogram.feature(layout, feature);
            if dataset.mapper(feature).is_categorical() {
                self.find_categorical_split(feature as u32, bins, parent)
            } else {
                self.find_numerical_split(feature as u32, bins, parent)
            }
        });

        let mut best = SplitInfo::invalid();
        for candidate in candidates {
            if candidate.gain > best.gain {
                best = candidate;
            }
        }
        best
    }

    /// Scan value bins left to right; bins `1..=b` go left.
    fn find_numerical_split(&self, feature: u32, bins: &[BinStats], parent: &BinStats) -> SplitInfo {
        let mut best = SplitInfo::invalid();
        let Some((missing, values)) = bins.split_first() else {
            return best;
        };

        let mut left = BinStats::default();
        for (idx, bin) in values.iter().enumerate() {
            left.merge(bin);
            let threshold = idx as u32 + 1;
            if let Some((gain, default_left)) = self.score_candidate(&left, missing, parent) {
                if gain > best.gain {
                    best = SplitInfo::numerical(feature, threshold, gain, default_left);
                }
            }
        }
        best
    }

    fn find_categorical_split(&self, feature: u32, bins: &[BinStats], parent: &BinStats) -> SplitInfo {
        let mut best = SplitInfo::invalid();
        let Some((missing, values)) = bins.split_first() else {
            return best;
        };

        // (category id, stats) for observed categories
        let mut observed: Vec<(u32, BinStats)> = values
            .iter()
            .enumerate()
            .filter(|(_, b)| b.count > 0)
            .map(|(cat, b)| (cat as u32, *b))
            .collect();
        if observed.len() < 2 && missing.count == 0 {
            return best;
        }

        if values.len() as u32 <= self.max_onehot_cats {
            // One category vs the rest.
            for (cat, stats) in &observed {
                if let Some((gain, default_left)) = self.score_candidate(stats, missing, parent) {
                    if gain > best.gain {
                        best = SplitInfo::categorical(feature, vec![*cat], gain, default_left);
                    }
                }
            }
            return best;
        }

        // Order by gradient ratio, then scan prefixes.
        let lambda = self.gain.reg_lambda as f64;
        observed.sort_by(|(ca, a), (cb, b)| {
            let ra = a.grad / (a.hess + lambda);
            let rb = b.grad / (b.hess + lambda);
            ra.total_cmp(&rb).then(ca.cmp(cb))
        });

        let mut left = BinStats::default();
        let mut best_prefix = 0;
        let mut best_gain = f32::NEG_INFINITY;
        let mut best_default_left = false;
        for (prefix, (_, stats)) in observed.iter().enumerate() {
            left.merge(stats);
            if let Some((gain, default_left)) = self.score_candidate(&left, missing, parent) {
                if gain > best_gain {
                    best_gain = gain;
                    best_prefix = prefix + 1;
                    best_default_left = default_left;
                }
            }
        }

        if best_prefix > 0 {
            let mut left_cats: Vec<u32> = observed[..best_prefix].iter().map(|(c, _)| *c).collect();
            left_cats.sort_unstable();
            best = SplitInfo::categorical(feature, left_cats, best_gain, best_default_left);
        }
        best
    }

    /// Score a candidate whose non-missing left side is `left`.
    ///
    /// Returns the best gain over both missing directions and whether missing
    /// values go left. Without training-time missing values the default
    /// follows the child with the larger hessian.
    fn score_candidate(
        &self,
        left: &BinStats,
        missing: &BinStats,
        parent: &BinStats,
    ) -> Option<(f32, bool)> {
        let mut best: Option<(f32, bool)> = None;

        // Missing goes right.
        let right = parent.minus(left);
        if self.gain.is_valid_split(left, &right) {
            let gain = self.gain.compute_gain(left, &right, parent);
            let default_left = missing.count == 0 && left.hess > right.hess;
            best = Some((gain, default_left));
        }

        if missing.count > 0 {
            let mut left_with_missing = *left;
            left_with_missing.merge(missing);
            let right = parent.minus(&left_with_missing);
            if self.gain.is_valid_split(&left_with_missing, &right) {
                let gain = self.gain.compute_gain(&left_with_missing, &right, parent);
                if best.is_none_or(|(g, _)| gain > g) {
                    best = Some((gain, true));
                }
            }
        }

        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::training::Gradients;
    use approx::assert_abs_diff_eq;

    fn params_no_constraints() -> GainParams {
        GainParams {
            reg_lambda: 0.0,
            min_child_weight: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn gain_of_symmetric_split() {
        let params = GainParams::default();
        let gain = params.compute_gain(
            &BinStats::new(10.0, 5.0, 5),
            &BinStats::new(-10.0, 5.0, 5),
            &BinStats::new(0.0, 10.0, 10),
        );
        // 0.5 * (100/6 + 100/6)
        assert_abs_diff_eq!(gain, 16.666_666, epsilon = 1e-3);
    }

    #[test]
    fn valid_split_constraints() {
        let params = GainParams {
            min_child_weight: 5.0,
            min_samples_leaf: 10,
            ..Default::default()
        };
        let ok = BinStats::new(0.0, 5.0, 10);
        assert!(params.is_valid_split(&ok, &ok));
        assert!(!params.is_valid_split(&BinStats::new(0.0, 4.0, 10), &ok));
        assert!(!params.is_valid_split(&BinStats::new(0.0, 5.0, 9), &ok));
    }

    #[test]
    fn leaf_weight_regularization() {
        let params = GainParams::default();
        assert_abs_diff_eq!(params.compute_leaf_weight(-10.0, 5.0), 10.0 / 6.0, epsilon = 1e-6);

        let l1 = GainParams {
            reg_alpha: 2.0,
            ..Default::default()
        };
        assert_eq!(l1.compute_leaf_weight(-1.0, 5.0), 0.0);
        assert_abs_diff_eq!(l1.compute_leaf_weight(-10.0, 5.0), 8.0 / 6.0, epsilon = 1e-6);
    }

    #[test]
    fn goes_left_rules() {
        let numeric = SplitInfo::numerical(0, 2, 1.0, true);
        assert!(numeric.goes_left(0));
        assert!(numeric.goes_left(2));
        assert!(!numeric.goes_left(3));

        let categorical = SplitInfo::categorical(0, vec![1, 3], 1.0, false);
        assert!(!categorical.goes_left(0));
        assert!(categorical.goes_left(2));
        assert!(categorical.goes_left(4));
        assert!(!categorical.goes_left(1));
    }

    fn find_best(dataset: &Dataset, grads: &[f32], splitter: &GreedySplitter) -> SplitInfo {
        let binned = BinnedDataset::from_dataset(dataset, 254, Parallelism::Sequential);
        let layout = HistogramLayout::from_binned(&binned);
        let mut gradients = Gradients::new(grads.len());
        for (i, &g) in grads.iter().enumerate() {
            gradients.set(i, g, 1.0);
        }
        let rows: Vec<u32> = (0..grads.len() as u32).collect();
        let mut hist = Histogram::new(&layout);
        hist.build(&layout, &binned, &gradients, &rows, Parallelism::Sequential);
        let parent = hist.totals(&layout);
        splitter.find_split(&hist, &layout, &binned, &parent, Parallelism::Sequential)
    }

    #[test]
    fn numerical_split_separates_gradients() {
        let dataset = Dataset::builder()
            .add_feature("x", vec![1.0, 2.0, 3.0, 4.0])
            .build()
            .unwrap();
        let splitter = GreedySplitter::new(params_no_constraints(), 4);
        let split = find_best(&dataset, &[-1.0, -1.0, 1.0, 1.0], &splitter);

        assert!(split.is_valid());
        assert_eq!(split.feature, 0);
        assert_eq!(split.split_type, SplitType::Numerical { bin: 2 });
    }

    #[test]
    fn missing_values_pick_direction() {
        let dataset = Dataset::builder()
            .add_feature("x", vec![1.0, 2.0, f32::NAN, 3.0, 4.0])
            .build()
            .unwrap();
        let splitter = GreedySplitter::new(params_no_constraints(), 4);
        let split = find_best(&dataset, &[-1.0, -1.0, -1.0, 1.0, 1.0], &splitter);

        assert_eq!(split.split_type, SplitType::Numerical { bin: 2 });
        assert!(split.default_left);
    }

    #[test]
    fn categorical_one_hot() {
        let dataset = Dataset::builder()
            .add_categorical("c", vec![0.0, 1.0, 2.0, 1.0, 0.0, 2.0])
            .build()
            .unwrap();
        let splitter = GreedySplitter::new(params_no_constraints(), 4);
        let split = find_best(&dataset, &[0.0, 5.0, 0.0, 5.0, 0.0, 0.0], &splitter);

        assert_eq!(split.split_type, SplitType::Categorical { left_cats: vec![1] });
    }

    #[test]
    fn categorical_partition_groups_by_ratio() {
        // 6 categories > max_onehot_cats: best split puts {0, 2, 4} together.
        let cats: Vec<f32> = (0..12).map(|i| (i % 6) as f32).collect();
        let grads: Vec<f32> = (0..12).map(|i| if (i % 6) % 2 == 0 { -1.0 } else { 1.0 }).collect();
        let dataset = Dataset::builder().add_categorical("c", cats).build().unwrap();
        let splitter = GreedySplitter::new(params_no_constraints(), 4);
        let split = find_best(&dataset, &grads, &splitter);

        assert_eq!(split.split_type, SplitType::Categorical { left_cats: vec![0, 2, 4] });
    }

    #[test]
    fn constant_feature_has_no_split() {
        let dataset = Dataset::builder()
            .add_feature("x", vec![1.0, 1.0, 1.0])
            .build()
            .unwrap();
        let splitter = GreedySplitter::new(GainParams::default(), 4);
        let split = find_best(&dataset, &[-1.0, 0.0, 1.0], &splitter);
        assert!(!split.is_valid());
    }
}
