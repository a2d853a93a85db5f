//! Dataset construction errors.

/// Errors raised while assembling a [`Dataset`](super::Dataset).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatasetError {
    #[error("dataset has no features")]
    EmptyFeatures,

    #[error("shape mismatch in {field}: expected {expected} samples, got {got}")]
    ShapeMismatch {
        expected: usize,
        got: usize,
        field: &'static str,
    },

    #[error("row index {index} out of bounds for {n_samples} samples")]
    RowOutOfBounds { index: usize, n_samples: usize },

    #[error("schema describes {schema} features but the matrix has {matrix}")]
    SchemaMismatch { schema: usize, matrix: usize },
}
