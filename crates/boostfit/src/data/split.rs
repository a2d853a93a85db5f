//! Seeded train/validation split.

use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::dataset::Dataset;
use super::error::DatasetError;

/// Errors raised while splitting rows.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplitError {
    #[error("validation fraction must be in (0, 1), got {0}")]
    InvalidFraction(f64),

    #[error("cannot split {n_rows} rows into non-empty train and validation partitions")]
    TooFewRows { n_rows: usize },
}

/// Disjoint row index sets covering `0..n_rows`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainValidSplit {
    pub train: Vec<usize>,
    pub valid: Vec<usize>,
}

impl TrainValidSplit {
    /// Materialize both partitions. Rows are renumbered from zero.
    pub fn apply(&self, dataset: &Dataset) -> Result<(Dataset, Dataset), DatasetError> {
        Ok((dataset.take_rows(&self.train)?, dataset.take_rows(&self.valid)?))
    }
}

/// Number of validation rows: `ceil(n_rows * valid_fraction)`.
#[inline]
pub fn validation_size(n_rows: usize, valid_fraction: f64) -> usize {
    ((n_rows as f64) * valid_fraction).ceil() as usize
}

/// Shuffle `0..n_rows` with a seeded generator and cut off the validation rows.
///
/// The same `(n_rows, valid_fraction, seed)` always yields the same split.
pub fn train_valid_split(
    n_rows: usize,
    valid_fraction: f64,
    seed: u64,
) -> Result<TrainValidSplit, SplitError> {
    if !(valid_fraction > 0.0 && valid_fraction < 1.0) {
        return Err(SplitError::InvalidFraction(valid_fraction));
    }

    let valid_len = validation_size(n_rows, valid_fraction);
    if valid_len == 0 || valid_len >= n_rows {
        return Err(SplitError::TooFewRows { n_rows });
    }

    let mut idx: Vec<usize> = (0..n_rows).collect();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    idx.shuffle(&mut rng);

    let (valid, train) = idx.split_at(valid_len);
    Ok(TrainValidSplit {
        train: train.to_vec(),
        valid: valid.to_vec(),
    })
}
