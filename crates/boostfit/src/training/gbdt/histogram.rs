//! Gradient histograms.
//!
//! One histogram holds, for every feature, the gradient sum, hessian sum and
//! row count of each bin. All features share one flat buffer; each feature
//! owns a contiguous slice given by [`HistogramLayout`].
//!
//! Bins accumulate in `f64` even though gradients are stored as `f32`: the
//! subtraction trick (sibling = parent - child) takes differences of large
//! sums.

use crate::data::BinnedDataset;
use crate::training::Gradients;
use crate::utils::Parallelism;

/// Accumulated statistics of one histogram bin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BinStats {
    pub grad: f64,
    pub hess: f64,
    pub count: u32,
}

impl BinStats {
    pub fn new(grad: f64, hess: f64, count: u32) -> Self {
        Self { grad, hess, count }
    }

    #[inline]
    pub fn add_sample(&mut self, grad: f32, hess: f32) {
        self.grad += grad as f64;
        self.hess += hess as f64;
        self.count += 1;
    }

    #[inline]
    pub fn merge(&mut self, other: &BinStats) {
        self.grad += other.grad;
        self.hess += other.hess;
        self.count += other.count;
    }

    #[inline]
    pub fn minus(&self, other: &BinStats) -> BinStats {
        BinStats {
            grad: self.grad - other.grad,
            hess: self.hess - other.hess,
            count: self.count.saturating_sub(other.count),
        }
    }
}

/// Offsets of each feature's bins in the flat histogram buffer.
#[derive(Clone, Debug)]
pub struct HistogramLayout {
    offsets: Vec<usize>,
    n_bins: Vec<usize>,
    total_bins: usize,
}

impl HistogramLayout {
    pub fn from_binned(dataset: &BinnedDataset) -> Self {
        let n_bins: Vec<usize> = dataset.mappers().iter().map(|m| m.n_bins() as usize).collect();
        let mut offsets = Vec::with_capacity(n_bins.len());
        let mut total_bins = 0;
        for &n in &n_bins {
            offsets.push(total_bins);
            total_bins += n;
        }
        Self {
            offsets,
            n_bins,
            total_bins,
        }
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.offsets.len()
    }

    #[inline]
    pub fn total_bins(&self) -> usize {
        self.total_bins
    }

    #[inline]
    pub fn feature_range(&self, feature: usize) -> std::ops::Range<usize> {
        let start = self.offsets[feature];
        start..start + self.n_bins[feature]
    }
}

/// Flat per-feature histogram.
#[derive(Clone, Debug)]
pub struct Histogram {
    bins: Box<[BinStats]>,
}

impl Histogram {
    pub fn new(layout: &HistogramLayout) -> Self {
        Self {
            bins: vec![BinStats::default(); layout.total_bins()].into_boxed_slice(),
        }
    }

    pub fn clear(&mut self) {
        self.bins.fill(BinStats::default());
    }

    /// Bins of one feature.
    #[inline]
    pub fn feature<'a>(&'a self, layout: &HistogramLayout, feature: usize) -> &'a [BinStats] {
        &self.bins[layout.feature_range(feature)]
    }

    /// Accumulate `rows` into the histogram.
    ///
    /// Features are processed independently, in parallel when allowed. Rows
    /// are always visited in the given order so the result does not depend on
    /// the thread count.
    pub fn build(
        &mut self,
        layout: &HistogramLayout,
        dataset: &BinnedDataset,
        gradients: &Gradients,
        rows: &[u32],
        parallelism: Parallelism,
    ) {
        let grads = gradients.grads();
        let hess = gradients.hess();

        let mut slices: Vec<(usize, &mut [BinStats])> = Vec::with_capacity(layout.n_features());
        let mut rest: &mut [BinStats] = &mut self.bins;
        for feature in 0..layout.n_features() {
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(layout.n_bins[feature]);
            slices.push((feature, head));
            rest = tail;
        }

        parallelism.maybe_par_for_each(slices, |(feature, hist)| {
            let bins = dataset.feature_bins(feature);
            for &row in rows {
                let row = row as usize;
                hist[bins[row] as usize].add_sample(grads[row], hess[row]);
            }
        });
    }

    /// `self = self - other`, turning a parent histogram into the sibling of
    /// `other`.
    pub fn subtract(&mut self, other: &Histogram) {
        for (bin, sub) in self.bins.iter_mut().zip(other.bins.iter()) {
            *bin = bin.minus(sub);
        }
    }

    /// Totals over the rows in this histogram.
    ///
    /// Every row lands in exactly one bin of each feature, so the first
    /// feature's bins suffice.
    pub fn totals(&self, layout: &HistogramLayout) -> BinStats {
        let mut total = BinStats::default();
        if layout.n_features() == 0 {
            return total;
        }
        for bin in self.feature(layout, 0) {
            total.merge(bin);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use approx::assert_abs_diff_eq;

    fn make_binned() -> BinnedDataset {
        let dataset = Dataset::builder()
            .add_feature("x", vec![1.0, 2.0, 3.0, f32::NAN])
            .add_categorical("c", vec![0.0, 1.0, 0.0, 1.0])
            .build()
            .unwrap();
        BinnedDataset::from_dataset(&dataset, 254, Parallelism::Sequential)
    }

    fn make_gradients() -> Gradients {
        let mut gradients = Gradients::new(4);
        for (i, g) in [1.0, -2.0, 3.0, 0.5].into_iter().enumerate() {
            gradients.set(i, g, 1.0);
        }
        gradients
    }

    #[test]
    fn build_accumulates_per_bin() {
        let binned = make_binned();
        let layout = HistogramLayout::from_binned(&binned);
        // x: missing + 3 values, c: missing + 2 categories
        assert_eq!(layout.total_bins(), 4 + 3);

        let mut hist = Histogram::new(&layout);
        hist.build(&layout, &binned, &make_gradients(), &[0, 1, 2, 3], Parallelism::Sequential);

        let x = hist.feature(&layout, 0);
        assert_eq!(x[0], BinStats::new(0.5, 1.0, 1));
        assert_eq!(x[1], BinStats::new(1.0, 1.0, 1));
        assert_eq!(x[3], BinStats::new(3.0, 1.0, 1));

        let c = hist.feature(&layout, 1);
        assert_eq!(c[0].count, 0);
        assert_eq!(c[1], BinStats::new(4.0, 2.0, 2));
        assert_eq!(c[2], BinStats::new(-1.5, 2.0, 2));

        let total = hist.totals(&layout);
        assert_abs_diff_eq!(total.grad, 2.5);
        assert_eq!(total.count, 4);
    }

    #[test]
    fn subtraction_matches_direct_build() {
        let binned = make_binned();
        let layout = HistogramLayout::from_binned(&binned);
        let gradients = make_gradients();

        let mut parent = Histogram::new(&layout);
        parent.build(&layout, &binned, &gradients, &[0, 1, 2, 3], Parallelism::Sequential);
        let mut left = Histogram::new(&layout);
        left.build(&layout, &binned, &gradients, &[0, 2], Parallelism::Sequential);
        let mut right = Histogram::new(&layout);
        right.build(&layout, &binned, &gradients, &[1, 3], Parallelism::Parallel);

        parent.subtract(&left);
        for f in 0..layout.n_features() {
            for (a, b) in parent.feature(&layout, f).iter().zip(right.feature(&layout, f)) {
                assert_abs_diff_eq!(a.grad, b.grad);
                assert_abs_diff_eq!(a.hess, b.hess);
                assert_eq!(a.count, b.count);
            }
        }
    }
}
