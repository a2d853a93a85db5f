//! Histogram-based GBDT training.
//!
//! - [`GBDTTrainer`]: boosting loop
//! - [`TreeGrower`]: grows one tree from gradients
//! - [`GreedySplitter`], [`GainParams`]: split search and regularization
//! - [`RowPartitioner`]: row-to-leaf assignment
//! - [`Histogram`]: per-feature gradient histograms

mod grower;
mod histogram;
mod partition;
mod split;
mod trainer;

pub use grower::{GrowerParams, GrowthStrategy, TreeGrower};
pub use histogram::{BinStats, Histogram, HistogramLayout};
pub use partition::{LeafId, RowPartitioner};
pub use split::{GainParams, GreedySplitter, SplitInfo, SplitType};
pub use trainer::{GBDTParams, GBDTTrainer, TrainError, TrainOutcome};
