//! Feature type definitions.
//!
//! This module defines the schema types that describe dataset structure.

use super::categories::CategoryVocab;

/// Logical feature types.
///
/// Features are stored as `f32` regardless of type. The `FeatureType` indicates
/// how to interpret the values during binning and splitting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum FeatureType {
    /// Continuous numeric feature.
    ///
    /// Missing values: `f32::NAN`
    #[default]
    Numeric,

    /// Categorical feature stored as float, interpreted as a dense category id.
    ///
    /// Missing values: `f32::NAN`
    /// Valid categories: `0.0, 1.0, 2.0, ..., n_categories-1.0`
    Categorical,
}

impl FeatureType {
    /// Returns true if this is a categorical feature.
    #[inline]
    pub fn is_categorical(&self) -> bool {
        matches!(self, FeatureType::Categorical)
    }

    /// Returns true if this is a numeric feature.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, FeatureType::Numeric)
    }
}

/// Metadata for a single feature.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureMeta {
    /// Feature name (optional).
    pub name: Option<String>,

    /// Feature type.
    pub feature_type: FeatureType,

    /// Label vocabulary for categorical features built from text values.
    pub vocab: Option<CategoryVocab>,
}

impl FeatureMeta {
    /// Create metadata for a numeric feature.
    pub fn numeric() -> Self {
        Self::default()
    }

    /// Create metadata for a numeric feature with a name.
    pub fn numeric_named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Create metadata for a categorical feature.
    pub fn categorical() -> Self {
        Self {
            feature_type: FeatureType::Categorical,
            ..Self::default()
        }
    }

    /// Create metadata for a categorical feature with a name.
    pub fn categorical_named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            feature_type: FeatureType::Categorical,
            vocab: None,
        }
    }

    /// Attach a category vocabulary.
    pub fn with_vocab(mut self, vocab: CategoryVocab) -> Self {
        self.vocab = Some(vocab);
        self
    }

    /// Number of known categories, if this is a categorical feature with a vocabulary.
    pub fn n_categories(&self) -> Option<usize> {
        self.vocab.as_ref().map(CategoryVocab::len)
    }
}

/// Schema describing all features in a dataset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DatasetSchema {
    features: Vec<FeatureMeta>,
}

impl DatasetSchema {
    /// Create a schema from feature metadata.
    pub fn from_features(features: Vec<FeatureMeta>) -> Self {
        Self { features }
    }

    /// Create a schema with `n` unnamed numeric features.
    pub fn all_numeric(n: usize) -> Self {
        Self {
            features: vec![FeatureMeta::numeric(); n],
        }
    }

    /// Create a schema with `n` unnamed features, flagging the given
    /// positions as categorical.
    ///
    /// Positions outside `0..n` are ignored.
    pub fn with_categorical(n: usize, categorical: &[usize]) -> Self {
        let mut schema = Self::all_numeric(n);
        for &idx in categorical {
            if let Some(meta) = schema.features.get_mut(idx) {
                meta.feature_type = FeatureType::Categorical;
            }
        }
        schema
    }

    /// Number of features.
    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.len()
    }

    /// Returns true if the schema has no features.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Get metadata for a feature.
    #[inline]
    pub fn get(&self, feature: usize) -> Option<&FeatureMeta> {
        self.features.get(feature)
    }

    /// Get the type of a feature. Out-of-range features read as numeric.
    #[inline]
    pub fn feature_type(&self, feature: usize) -> FeatureType {
        self.features
            .get(feature)
            .map(|f| f.feature_type)
            .unwrap_or_default()
    }

    /// Returns true if the feature at `feature` is categorical.
    #[inline]
    pub fn is_categorical(&self, feature: usize) -> bool {
        self.feature_type(feature).is_categorical()
    }

    /// Returns true if any feature is categorical.
    pub fn has_categorical(&self) -> bool {
        self.features.iter().any(|f| f.feature_type.is_categorical())
    }

    /// Positional indices of categorical features, ascending.
    pub fn categorical_indices(&self) -> Vec<usize> {
        self.features
            .iter()
            .enumerate()
            .filter(|(_, f)| f.feature_type.is_categorical())
            .map(|(i, _)| i)
            .collect()
    }

    /// Feature names, with `f{i}` standing in for unnamed features.
    pub fn feature_names(&self) -> Vec<String> {
        self.features
            .iter()
            .enumerate()
            .map(|(i, f)| f.name.clone().unwrap_or_else(|| format!("f{i}")))
            .collect()
    }

    /// Find a feature by name.
    pub fn feature_index(&self, name: &str) -> Option<usize> {
        self.features
            .iter()
            .position(|f| f.name.as_deref() == Some(name))
    }

    /// Iterate over feature metadata.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureMeta> {
        self.features.iter()
    }

    /// Whether `other` describes the same columns (names and types).
    ///
    /// Vocabularies are not compared.
    pub fn is_compatible_with(&self, other: &DatasetSchema) -> bool {
        self.n_features() == other.n_features()
            && self
                .features
                .iter()
                .zip(&other.features)
                .all(|(a, b)| a.feature_type == b.feature_type && a.name == b.name)
    }
}

impl FromIterator<FeatureMeta> for DatasetSchema {
    fn from_iter<I: IntoIterator<Item = FeatureMeta>>(iter: I) -> Self {
        Self::from_features(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_type() {
        assert!(FeatureType::Numeric.is_numeric());
        assert!(!FeatureType::Numeric.is_categorical());
        assert!(FeatureType::Categorical.is_categorical());
        assert_eq!(FeatureType::default(), FeatureType::Numeric);
    }

    #[test]
    fn test_with_categorical_flags_positions() {
        let schema = DatasetSchema::with_categorical(4, &[2, 3, 9]);
        assert_eq!(schema.n_features(), 4);
        assert_eq!(schema.categorical_indices(), vec![2, 3]);
        assert!(!schema.is_categorical(0));
        assert!(schema.has_categorical());
    }

    #[test]
    fn test_feature_names_fill_unnamed() {
        let schema = DatasetSchema::from_features(vec![
            FeatureMeta::numeric_named("a"),
            FeatureMeta::numeric(),
            FeatureMeta::categorical_named("c"),
        ]);
        assert_eq!(schema.feature_names(), vec!["a", "f1", "c"]);
        assert_eq!(schema.feature_index("c"), Some(2));
        assert_eq!(schema.feature_index("b"), None);
    }

    #[test]
    fn test_compatibility_ignores_vocab() {
        let mut vocab = CategoryVocab::new();
        vocab.encode_or_insert("x");
        let a = DatasetSchema::from_features(vec![
            FeatureMeta::numeric_named("a"),
            FeatureMeta::categorical_named("c").with_vocab(vocab),
        ]);
        let b = DatasetSchema::from_features(vec![
            FeatureMeta::numeric_named("a"),
            FeatureMeta::categorical_named("c"),
        ]);
        assert!(a.is_compatible_with(&b));
        assert!(!a.is_compatible_with(&DatasetSchema::all_numeric(2)));
    }
}
