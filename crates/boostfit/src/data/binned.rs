//! Quantized feature storage for histogram-based training.
//!
//! Every feature is mapped to small integer bins. Bin `0` is reserved for
//! missing values (`NAN`) on both feature kinds:
//!
//! - numeric: bin `b >= 1` holds values in `(cuts[b - 2], cuts[b - 1]]`
//! - categorical: category id `k` maps to bin `k + 1`

use super::dataset::Dataset;
use crate::utils::Parallelism;

/// Default maximum number of value bins per numeric feature.
pub const DEFAULT_MAX_BINS: u32 = 254;

// ============================================================================
// BinMapper
// ============================================================================

/// Mapping from raw feature values to bin indices.
#[derive(Clone, Debug, PartialEq)]
pub enum BinMapper {
    /// Ordered bins separated by strictly increasing cut points.
    Numeric { cuts: Box<[f32]> },
    /// One bin per category id.
    Categorical { n_categories: u32 },
}

impl BinMapper {
    /// Build quantile cuts from a column of values.
    ///
    /// With at most `max_bins` distinct values every value gets its own bin
    /// and cuts sit at midpoints. Otherwise cuts are placed at (deduplicated)
    /// quantile boundaries, giving at most `max_bins` value bins.
    pub fn numeric_from_values(values: impl IntoIterator<Item = f32>, max_bins: u32) -> Self {
        let mut sorted: Vec<f32> = values.into_iter().filter(|v| !v.is_nan()).collect();
        sorted.sort_unstable_by(f32::total_cmp);

        let max_bins = max_bins.max(1) as usize;
        let mut distinct = sorted.clone();
        distinct.dedup();

        let mut cuts = Vec::new();
        if distinct.len() <= max_bins {
            for pair in distinct.windows(2) {
                cuts.push(midpoint(pair[0], pair[1]));
            }
        } else {
            let n = sorted.len();
            for k in 1..max_bins {
                let pos = k * n / max_bins;
                if pos == 0 || pos >= n {
                    continue;
                }
                let (lo, hi) = (sorted[pos - 1], sorted[pos]);
                if lo < hi {
                    let cut = midpoint(lo, hi);
                    if cuts.last().is_none_or(|&last| cut > last) {
                        cuts.push(cut);
                    }
                }
            }
        }

        BinMapper::Numeric {
            cuts: cuts.into_boxed_slice(),
        }
    }

    pub fn categorical(n_categories: u32) -> Self {
        BinMapper::Categorical { n_categories }
    }

    #[inline]
    pub fn is_categorical(&self) -> bool {
        matches!(self, BinMapper::Categorical { .. })
    }

    /// Number of bins, including the missing bin.
    #[inline]
    pub fn n_bins(&self) -> u32 {
        match self {
            BinMapper::Numeric { cuts } => cuts.len() as u32 + 2,
            BinMapper::Categorical { n_categories } => n_categories + 1,
        }
    }

    /// Bin of a raw value. Out-of-range categories read as missing.
    #[inline]
    pub fn value_to_bin(&self, value: f32) -> u32 {
        if value.is_nan() {
            return 0;
        }
        match self {
            BinMapper::Numeric { cuts } => cuts.partition_point(|&c| c < value) as u32 + 1,
            BinMapper::Categorical { n_categories } => {
                if value < 0.0 || value >= *n_categories as f32 {
                    0
                } else {
                    value as u32 + 1
                }
            }
        }
    }

    /// Raw threshold for a numeric split that sends bins `1..=bin` left.
    ///
    /// Values `<= threshold` fall in those bins.
    #[inline]
    pub fn bin_upper_bound(&self, bin: u32) -> f32 {
        match self {
            BinMapper::Numeric { cuts } => {
                let idx = (bin as usize).saturating_sub(1);
                cuts.get(idx).copied().unwrap_or(f32::INFINITY)
            }
            BinMapper::Categorical { .. } => f32::NAN,
        }
    }

    /// Category id held by a categorical bin.
    #[inline]
    pub fn bin_to_category(bin: u32) -> Option<u32> {
        bin.checked_sub(1)
    }
}

#[inline]
fn midpoint(lo: f32, hi: f32) -> f32 {
    let mid = ((lo as f64 + hi as f64) / 2.0) as f32;
    if mid < hi { mid } else { lo }
}

// ============================================================================
// BinnedDataset
// ============================================================================

/// Feature-major binned copy of a [`Dataset`].
#[derive(Clone, Debug)]
pub struct BinnedDataset {
    n_samples: usize,
    mappers: Vec<BinMapper>,
    bins: Vec<Box<[u32]>>,
}

impl BinnedDataset {
    /// Bin every feature of `dataset`.
    ///
    /// Categorical features take their category count from the schema
    /// vocabulary when present, otherwise from the largest id observed.
    pub fn from_dataset(dataset: &Dataset, max_bins: u32, parallelism: Parallelism) -> Self {
        let schema = dataset.schema();
        let columns = parallelism.maybe_par_map(0..dataset.n_features(), |f| {
            let values = dataset.feature(f);
            let mapper = if schema.is_categorical(f) {
                let n_categories = schema
                    .get(f)
                    .and_then(|m| m.n_categories())
                    .map(|n| n as u32)
                    .unwrap_or_else(|| {
                        values
                            .iter()
                            .filter(|v| !v.is_nan() && **v >= 0.0)
                            .map(|&v| v as u32 + 1)
                            .max()
                            .unwrap_or(0)
                    });
                BinMapper::categorical(n_categories)
            } else {
                BinMapper::numeric_from_values(values.iter().copied(), max_bins)
            };
            let bins: Box<[u32]> = values.iter().map(|&v| mapper.value_to_bin(v)).collect();
            (mapper, bins)
        });

        let (mappers, bins) = columns.into_iter().unzip();
        Self {
            n_samples: dataset.n_samples(),
            mappers,
            bins,
        }
    }

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.mappers.len()
    }

    #[inline]
    pub fn mapper(&self, feature: usize) -> &BinMapper {
        &self.mappers[feature]
    }

    pub fn mappers(&self) -> &[BinMapper] {
        &self.mappers
    }

    /// Bins of one feature for every sample.
    #[inline]
    pub fn feature_bins(&self, feature: usize) -> &[u32] {
        &self.bins[feature]
    }

    /// Total bins across features (histogram size).
    pub fn total_bins(&self) -> usize {
        self.mappers.iter().map(|m| m.n_bins() as usize).sum()
    }
}
