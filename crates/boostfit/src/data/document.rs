//! JSON training documents.
//!
//! A training document names its numeric and categorical features and holds
//! one array per column:
//!
//! ```json
//! {
//!   "catboost_feature_order": ["a", "b"],
//!   "catboost_cat_feature_order": ["c"],
//!   "training_data": {
//!     "a": [0.1, 0.2], "b": [1, 2], "c": ["NN", "VB"], "output": [1, 0]
//!   }
//! }
//! ```
//!
//! Columns are laid out numeric first, then categorical, so categorical
//! features occupy positions `n_numeric..n_numeric + n_categorical`.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader};
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::categories::{CategoryVocab, category_label};
use super::dataset::Dataset;
use super::error::DatasetError;
use super::schema::DatasetSchema;

/// Name of the target column in `training_data`.
pub const TARGET_COLUMN: &str = "output";

/// Errors raised while reading a training document or turning it into a dataset.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed training document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("missing column \"{0}\" in training_data")]
    MissingColumn(String),

    #[error("column \"{column}\" has {actual} rows, expected {expected}")]
    LengthMismatch {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("invalid value in column \"{column}\" at row {row}: {reason}")]
    InvalidValue {
        column: String,
        row: usize,
        reason: &'static str,
    },

    #[error("document does not match the model schema: {0}")]
    SchemaMismatch(String),

    #[error(transparent)]
    Dataset(#[from] DatasetError),
}

/// Deserialized training document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingDocument {
    /// Ordered numeric feature names.
    #[serde(rename = "catboost_feature_order")]
    pub numeric_features: Vec<String>,

    /// Ordered categorical feature names.
    #[serde(rename = "catboost_cat_feature_order")]
    pub categorical_features: Vec<String>,

    /// Column arrays keyed by feature name, plus [`TARGET_COLUMN`].
    pub training_data: HashMap<String, Vec<Value>>,
}

impl TrainingDocument {
    /// Read and parse a document from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DocumentError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Parse a document from a JSON string.
    pub fn from_json_str(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    #[inline]
    pub fn n_numeric(&self) -> usize {
        self.numeric_features.len()
    }

    #[inline]
    pub fn n_categorical(&self) -> usize {
        self.categorical_features.len()
    }

    /// Positions of the categorical columns in the assembled feature matrix.
    pub fn categorical_indices(&self) -> Range<usize> {
        categorical_feature_indices(self.n_numeric(), self.n_categorical())
    }

    /// Number of rows, taken from the target column.
    pub fn n_rows(&self) -> Result<usize, DocumentError> {
        self.column(TARGET_COLUMN).map(<[Value]>::len)
    }

    fn column(&self, name: &str) -> Result<&[Value], DocumentError> {
        self.training_data
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| DocumentError::MissingColumn(name.to_string()))
    }

    fn column_with_len(&self, name: &str, expected: usize) -> Result<&[Value], DocumentError> {
        let column = self.column(name)?;
        if column.len() != expected {
            return Err(DocumentError::LengthMismatch {
                column: name.to_string(),
                expected,
                actual: column.len(),
            });
        }
        Ok(column)
    }

    /// Target vector from the `"output"` column.
    ///
    /// `null` targets read as `NAN`; the trainer rejects them.
    pub fn targets(&self) -> Result<Vec<f32>, DocumentError> {
        let column = self.column(TARGET_COLUMN)?;
        column
            .iter()
            .enumerate()
            .map(|(row, v)| numeric_cell(TARGET_COLUMN, row, v))
            .collect()
    }

    /// Assemble the training dataset.
    ///
    /// Category vocabularies are built from this document in first-seen order.
    pub fn to_dataset(&self) -> Result<Dataset, DocumentError> {
        let n_rows = self.n_rows()?;
        let targets = self.targets()?;

        let mut builder = Dataset::builder();
        for name in &self.numeric_features {
            builder = builder.add_feature(name, self.numeric_column(name, n_rows)?);
        }
        for name in &self.categorical_features {
            let column = self.column_with_len(name, n_rows)?;
            let mut vocab = CategoryVocab::new();
            let values = column
                .iter()
                .enumerate()
                .map(|(row, v)| {
                    let label = categorical_cell(name, row, v)?;
                    Ok(vocab.encode_or_insert(label) as f32)
                })
                .collect::<Result<Vec<_>, DocumentError>>()?;
            builder = builder.add_categorical_with_vocab(name, values, vocab);
        }

        Ok(builder.targets(targets).build()?)
    }

    /// Assemble a dataset against an existing schema (e.g. a trained model's).
    ///
    /// Categories unknown to the schema's vocabularies become missing.
    /// Targets are attached when the document has an `"output"` column.
    pub fn to_dataset_with_schema(&self, schema: &DatasetSchema) -> Result<Dataset, DocumentError> {
        let names: Vec<&String> = self
            .numeric_features
            .iter()
            .chain(&self.categorical_features)
            .collect();
        if names.len() != schema.n_features() {
            return Err(DocumentError::SchemaMismatch(format!(
                "document has {} features, model expects {}",
                names.len(),
                schema.n_features()
            )));
        }

        let targets = self.training_data.contains_key(TARGET_COLUMN).then(|| self.targets());
        let targets = targets.transpose()?;
        let n_rows = match &targets {
            Some(t) => t.len(),
            None => names
                .first()
                .map(|name| self.column(name).map(<[Value]>::len))
                .transpose()?
                .unwrap_or(0),
        };

        let mut builder = Dataset::builder();
        for (idx, (name, meta)) in names.iter().zip(schema.iter()).enumerate() {
            let expect_categorical = idx >= self.n_numeric();
            if meta.feature_type.is_categorical() != expect_categorical {
                return Err(DocumentError::SchemaMismatch(format!(
                    "feature \"{name}\" at position {idx} has a different type in the model"
                )));
            }

            if !expect_categorical {
                builder = builder.add_feature(name, self.numeric_column(name, n_rows)?);
                continue;
            }

            let column = self.column_with_len(name, n_rows)?;
            let values = column
                .iter()
                .enumerate()
                .map(|(row, v)| {
                    let label = categorical_cell(name, row, v)?;
                    Ok(match &meta.vocab {
                        Some(vocab) => vocab.get(&label).map_or(f32::NAN, |id| id as f32),
                        None => f32::NAN,
                    })
                })
                .collect::<Result<Vec<_>, DocumentError>>()?;
            builder = match &meta.vocab {
                Some(vocab) => builder.add_categorical_with_vocab(name, values, vocab.clone()),
                None => builder.add_categorical(name, values),
            };
        }

        if let Some(targets) = targets {
            builder = builder.targets(targets);
        }
        Ok(builder.build()?)
    }

    fn numeric_column(&self, name: &str, n_rows: usize) -> Result<Vec<f32>, DocumentError> {
        self.column_with_len(name, n_rows)?
            .iter()
            .enumerate()
            .map(|(row, v)| numeric_cell(name, row, v))
            .collect()
    }
}

/// Positions of categorical columns when numeric columns come first.
pub fn categorical_feature_indices(n_numeric: usize, n_categorical: usize) -> Range<usize> {
    n_numeric..n_numeric + n_categorical
}

fn numeric_cell(column: &str, row: usize, value: &Value) -> Result<f32, DocumentError> {
    match value {
        Value::Number(n) => n.as_f64().map(|f| f as f32).ok_or_else(|| DocumentError::InvalidValue {
            column: column.to_string(),
            row,
            reason: "number out of range",
        }),
        Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        Value::Null => Ok(f32::NAN),
        Value::String(_) | Value::Array(_) | Value::Object(_) => Err(DocumentError::InvalidValue {
            column: column.to_string(),
            row,
            reason: "expected a number",
        }),
    }
}

fn categorical_cell(column: &str, row: usize, value: &Value) -> Result<String, DocumentError> {
    category_label(value).ok_or_else(|| DocumentError::InvalidValue {
        column: column.to_string(),
        row,
        reason: "expected a string, integer or boolean category",
    })
}
