//! Pipeline errors.

use crate::data::{DatasetError, DocumentError, SplitError};
use crate::model::gbdt::ConfigError;
use crate::persist::SerializeError;
use crate::training::TrainError;

/// Any failure that ends a training run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("cannot locate the executable directory: {0}")]
    Location(#[source] std::io::Error),

    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error("failed to split rows: {0}")]
    Split(#[from] SplitError),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("invalid training configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("training failed: {0}")]
    Train(#[from] TrainError),

    #[error("failed to save model to {}: {source}", path.display())]
    Save {
        path: std::path::PathBuf,
        #[source]
        source: SerializeError,
    },
}
