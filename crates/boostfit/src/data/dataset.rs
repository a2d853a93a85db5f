//! Dataset container and builder.
//!
//! This module provides [`Dataset`] and [`DatasetBuilder`] for creating
//! raw feature datasets. For training, the trainer bins a dataset into a
//! [`BinnedDataset`](super::BinnedDataset).

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use super::categories::CategoryVocab;
use super::error::DatasetError;
use super::schema::{DatasetSchema, FeatureMeta};

/// Feature matrix with an optional regression target.
///
/// # Storage Layout
///
/// Features are stored in **feature-major** layout: `[n_features, n_samples]`.
/// Each feature's values across all samples are contiguous in memory.
/// Missing values are `f32::NAN`.
///
/// # Example
///
/// ```
/// use boostfit::data::Dataset;
/// use ndarray::array;
///
/// // Feature-major format: 2 features, 3 samples
/// let features = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
/// let targets = array![0.0, 1.0, 0.0];
/// let ds = Dataset::new(features, Some(targets)).unwrap();
///
/// assert_eq!(ds.n_samples(), 3);
/// assert_eq!(ds.n_features(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature data: `[n_features, n_samples]` (feature-major).
    features: Array2<f32>,

    /// Feature metadata.
    schema: DatasetSchema,

    /// Target values, one per sample.
    targets: Option<Array1<f32>>,
}

impl Dataset {
    /// Create an all-numeric dataset from a feature-major matrix.
    ///
    /// For categorical features or named columns, use [`Dataset::builder`]
    /// or [`Dataset::with_schema`].
    pub fn new(features: Array2<f32>, targets: Option<Array1<f32>>) -> Result<Self, DatasetError> {
        let n_samples = features.ncols();
        if let Some(t) = &targets
            && t.len() != n_samples
        {
            return Err(DatasetError::ShapeMismatch {
                expected: n_samples,
                got: t.len(),
                field: "targets",
            });
        }

        let schema = DatasetSchema::all_numeric(features.nrows());
        Ok(Self {
            features,
            schema,
            targets,
        })
    }

    /// Create a builder for column-by-column construction.
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::new()
    }

    /// Replace the schema.
    pub fn with_schema(mut self, schema: DatasetSchema) -> Result<Self, DatasetError> {
        if schema.n_features() != self.n_features() {
            return Err(DatasetError::SchemaMismatch {
                schema: schema.n_features(),
                matrix: self.n_features(),
            });
        }
        self.schema = schema;
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.ncols()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.nrows()
    }

    #[inline]
    pub fn schema(&self) -> &DatasetSchema {
        &self.schema
    }

    #[inline]
    pub fn has_categorical(&self) -> bool {
        self.schema.has_categorical()
    }

    #[inline]
    pub fn has_targets(&self) -> bool {
        self.targets.is_some()
    }

    /// Feature-major view `[n_features, n_samples]`.
    #[inline]
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    /// All values of one feature.
    #[inline]
    pub fn feature(&self, feature: usize) -> ArrayView1<'_, f32> {
        self.features.row(feature)
    }

    #[inline]
    pub fn targets(&self) -> Option<ArrayView1<'_, f32>> {
        self.targets.as_ref().map(|t| t.view())
    }

    /// Single feature value.
    #[inline]
    pub fn get_feature_value(&self, feature: usize, sample: usize) -> f32 {
        self.features[[feature, sample]]
    }

    /// Copy one sample's feature values into `buffer`.
    ///
    /// `buffer` must hold at least `n_features` values.
    pub fn copy_sample(&self, sample: usize, buffer: &mut [f32]) {
        for (dst, &v) in buffer.iter_mut().zip(self.features.column(sample)) {
            *dst = v;
        }
    }

    /// New dataset holding the given rows, renumbered `0..indices.len()` in
    /// the order given. Schema (including vocabularies) is shared.
    pub fn take_rows(&self, indices: &[usize]) -> Result<Dataset, DatasetError> {
        let n_samples = self.n_samples();
        if let Some(&index) = indices.iter().find(|&&i| i >= n_samples) {
            return Err(DatasetError::RowOutOfBounds { index, n_samples });
        }

        Ok(Dataset {
            features: self.features.select(Axis(1), indices),
            schema: self.schema.clone(),
            targets: self.targets.as_ref().map(|t| t.select(Axis(0), indices)),
        })
    }
}

// =============================================================================
// DatasetBuilder
// =============================================================================

/// Builder for datasets with named and categorical columns.
///
/// # Example
///
/// ```
/// use boostfit::data::Dataset;
///
/// let ds = Dataset::builder()
///     .add_feature("age", vec![25.0, 30.0, 35.0])
///     .add_categorical("color", vec![0.0, 1.0, 2.0])
///     .targets(vec![0.0, 1.0, 0.0])
///     .build()
///     .unwrap();
///
/// assert_eq!(ds.n_features(), 2);
/// assert!(ds.has_categorical());
/// ```
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    columns: Vec<Vec<f32>>,
    metas: Vec<FeatureMeta>,
    targets: Option<Vec<f32>>,
}

impl DatasetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a numeric feature column.
    pub fn add_feature(mut self, name: &str, values: Vec<f32>) -> Self {
        self.columns.push(values);
        self.metas.push(FeatureMeta::numeric_named(name));
        self
    }

    /// Add a categorical feature column.
    ///
    /// Values are category ids encoded as floats (`0.0, 1.0, ...`);
    /// `NAN` marks a missing category.
    pub fn add_categorical(mut self, name: &str, values: Vec<f32>) -> Self {
        self.columns.push(values);
        self.metas.push(FeatureMeta::categorical_named(name));
        self
    }

    /// Add a categorical feature column together with its label vocabulary.
    pub fn add_categorical_with_vocab(
        mut self,
        name: &str,
        values: Vec<f32>,
        vocab: CategoryVocab,
    ) -> Self {
        self.columns.push(values);
        self.metas
            .push(FeatureMeta::categorical_named(name).with_vocab(vocab));
        self
    }

    /// Set target values.
    pub fn targets(mut self, targets: Vec<f32>) -> Self {
        self.targets = Some(targets);
        self
    }

    /// Build the dataset.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if no features were added, or if feature
    /// columns or targets disagree on the sample count.
    pub fn build(self) -> Result<Dataset, DatasetError> {
        let Some(first) = self.columns.first() else {
            return Err(DatasetError::EmptyFeatures);
        };
        let n_samples = first.len();
        let n_features = self.columns.len();

        for col in &self.columns {
            if col.len() != n_samples {
                return Err(DatasetError::ShapeMismatch {
                    expected: n_samples,
                    got: col.len(),
                    field: "features",
                });
            }
        }

        if let Some(targets) = &self.targets
            && targets.len() != n_samples
        {
            return Err(DatasetError::ShapeMismatch {
                expected: n_samples,
                got: targets.len(),
                field: "targets",
            });
        }

        let mut features = Array2::zeros((n_features, n_samples));
        for (mut row, col) in features.rows_mut().into_iter().zip(&self.columns) {
            row.assign(&ArrayView1::from(col.as_slice()));
        }

        Ok(Dataset {
            features,
            schema: DatasetSchema::from_features(self.metas),
            targets: self.targets.map(Array1::from),
        })
    }
}
