//! Conversion between runtime types and payload types.
//!
//! Runtime → payload conversions are infallible `From` impls; payload →
//! runtime conversions are `TryFrom` and reject payloads that would build an
//! inconsistent model.

use super::native::DeserializeError;
use super::payload::{
    CategoriesPayload, ConfigPayload, FeatureKindPayload, FeaturePayload, ForestPayload,
    GrowthStrategyPayload, ModelMetadata, PayloadV1, TreePayload,
};
use crate::data::{CategoryVocab, DatasetSchema, FeatureMeta, FeatureType};
use crate::model::gbdt::{GBDTConfig, RegularizationParams, TreeParams};
use crate::model::{GBDTModel, ModelMeta};
use crate::repr::gbdt::{
    CategoriesStorage, Forest, SplitType, Tree, bitset_to_categories, categories_to_bitset,
};
use crate::training::gbdt::GrowthStrategy;
use crate::training::{Metric, MetricFn, Objective, ObjectiveFn, Verbosity};

fn invalid(msg: impl Into<String>) -> DeserializeError {
    DeserializeError::Validation(msg.into())
}

// =============================================================================
// Metadata conversions
// =============================================================================

impl From<&FeatureMeta> for FeaturePayload {
    fn from(meta: &FeatureMeta) -> Self {
        FeaturePayload {
            name: meta.name.clone(),
            kind: match meta.feature_type {
                FeatureType::Numeric => FeatureKindPayload::Numeric,
                FeatureType::Categorical => FeatureKindPayload::Categorical,
            },
            vocab: meta.vocab.as_ref().map(|v| v.labels().to_vec()),
        }
    }
}

impl TryFrom<FeaturePayload> for FeatureMeta {
    type Error = DeserializeError;

    fn try_from(payload: FeaturePayload) -> Result<Self, Self::Error> {
        let feature_type = match payload.kind {
            FeatureKindPayload::Numeric => FeatureType::Numeric,
            FeatureKindPayload::Categorical => FeatureType::Categorical,
        };
        let vocab = match payload.vocab {
            None => None,
            Some(_) if feature_type.is_numeric() => {
                return Err(invalid("numeric feature carries a category vocabulary"));
            }
            Some(labels) => {
                let n_labels = labels.len();
                let vocab = CategoryVocab::from_labels(labels);
                if vocab.len() != n_labels {
                    return Err(invalid("category vocabulary has duplicate labels"));
                }
                Some(vocab)
            }
        };
        Ok(FeatureMeta {
            name: payload.name,
            feature_type,
            vocab,
        })
    }
}

impl From<&ModelMeta> for ModelMetadata {
    fn from(meta: &ModelMeta) -> Self {
        ModelMetadata {
            features: meta.schema.iter().map(FeaturePayload::from).collect(),
            n_rounds: meta.n_rounds as u32,
            best_iteration: meta.best_iteration.map(|b| b as u32),
            best_score: meta.best_score,
        }
    }
}

impl TryFrom<ModelMetadata> for ModelMeta {
    type Error = DeserializeError;

    fn try_from(payload: ModelMetadata) -> Result<Self, Self::Error> {
        let features = payload
            .features
            .into_iter()
            .map(FeatureMeta::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ModelMeta {
            schema: DatasetSchema::from_features(features),
            n_rounds: payload.n_rounds as usize,
            best_iteration: payload.best_iteration.map(|b| b as usize),
            best_score: payload.best_score,
        })
    }
}

// =============================================================================
// Tree conversions
// =============================================================================

impl From<&Tree> for TreePayload {
    fn from(tree: &Tree) -> Self {
        let n_nodes = tree.n_nodes() as u32;

        let mut categories = CategoriesPayload::default();
        if tree.has_categorical() {
            for node in 0..n_nodes {
                if tree.split_type(node) == SplitType::Categorical && !tree.is_leaf(node) {
                    categories.node_indices.push(node);
                    categories
                        .category_sets
                        .push(bitset_to_categories(tree.categories().bitset_for_node(node)));
                }
            }
        }

        TreePayload {
            num_nodes: n_nodes,
            split_features: tree.split_indices().to_vec(),
            thresholds: tree.split_thresholds().to_vec(),
            left_children: tree.left_children().to_vec(),
            right_children: tree.right_children().to_vec(),
            default_left: tree.default_lefts().to_vec(),
            is_leaf: tree.leaf_flags().to_vec(),
            leaf_values: tree.leaf_values().to_vec(),
            split_types: tree.split_types().iter().map(|&t| t as u8).collect(),
            gains: tree.gains().to_vec(),
            covers: tree.covers().to_vec(),
            categories,
        }
    }
}

impl TryFrom<TreePayload> for Tree {
    type Error = DeserializeError;

    fn try_from(payload: TreePayload) -> Result<Self, Self::Error> {
        let n_nodes = payload.num_nodes as usize;
        if payload.split_types.len() != n_nodes {
            return Err(invalid(format!(
                "split_types has length {}, expected {n_nodes}",
                payload.split_types.len()
            )));
        }
        if payload.categories.node_indices.len() != payload.categories.category_sets.len() {
            return Err(invalid("categorical node indices and category sets differ in length"));
        }

        let split_types: Vec<SplitType> = payload.split_types.iter().map(|&t| SplitType::from(t)).collect();

        let categories = if payload.categories.node_indices.is_empty() {
            CategoriesStorage::empty()
        } else {
            let mut bitsets = Vec::new();
            let mut segments = vec![(0u32, 0u32); n_nodes];
            for (&node, cats) in payload
                .categories
                .node_indices
                .iter()
                .zip(&payload.categories.category_sets)
            {
                let Some(segment) = segments.get_mut(node as usize) else {
                    return Err(invalid(format!("categorical node {node} out of bounds")));
                };
                if split_types[node as usize] != SplitType::Categorical {
                    return Err(invalid(format!("node {node} has categories but a numeric split")));
                }
                let bitset = categories_to_bitset(cats);
                *segment = (bitsets.len() as u32, bitset.len() as u32);
                bitsets.extend(bitset);
            }
            CategoriesStorage::new(bitsets, segments)
        };

        let tree = Tree::new(
            payload.split_features,
            payload.thresholds,
            payload.left_children,
            payload.right_children,
            payload.default_left,
            payload.is_leaf,
            payload.leaf_values,
            split_types,
            categories,
        )
        .with_stats(payload.gains, payload.covers);

        tree.validate().map_err(|e| invalid(e.to_string()))?;
        Ok(tree)
    }
}

// =============================================================================
// Forest conversions
// =============================================================================

impl From<&Forest> for ForestPayload {
    fn from(forest: &Forest) -> Self {
        ForestPayload {
            base_score: forest.base_score(),
            trees: forest.trees().map(TreePayload::from).collect(),
        }
    }
}

impl TryFrom<ForestPayload> for Forest {
    type Error = DeserializeError;

    fn try_from(payload: ForestPayload) -> Result<Self, Self::Error> {
        let mut forest = Forest::new(payload.base_score);
        for tree in payload.trees {
            forest.push_tree(Tree::try_from(tree)?);
        }
        forest.validate().map_err(|e| invalid(e.to_string()))?;
        Ok(forest)
    }
}

// =============================================================================
// GBDTConfig conversions
// =============================================================================

impl From<GrowthStrategy> for GrowthStrategyPayload {
    fn from(gs: GrowthStrategy) -> Self {
        match gs {
            GrowthStrategy::DepthWise { max_depth } => Self::DepthWise { max_depth },
            GrowthStrategy::LeafWise { max_leaves } => Self::LeafWise { max_leaves },
        }
    }
}

impl From<GrowthStrategyPayload> for GrowthStrategy {
    fn from(gs: GrowthStrategyPayload) -> Self {
        match gs {
            GrowthStrategyPayload::DepthWise { max_depth } => Self::DepthWise { max_depth },
            GrowthStrategyPayload::LeafWise { max_leaves } => Self::LeafWise { max_leaves },
        }
    }
}

impl From<&GBDTConfig> for ConfigPayload {
    fn from(config: &GBDTConfig) -> Self {
        ConfigPayload {
            objective: config.objective.name().to_string(),
            metric: config.metric.map(|m| m.name().to_string()),
            n_trees: config.n_trees,
            learning_rate: config.learning_rate,
            growth_strategy: config.tree.growth_strategy.into(),
            max_onehot_cats: config.tree.max_onehot_cats,
            lambda: config.regularization.lambda,
            alpha: config.regularization.alpha,
            min_child_weight: config.regularization.min_child_weight,
            min_gain: config.regularization.min_gain,
            min_samples_leaf: config.regularization.min_samples_leaf,
            max_bins: config.max_bins,
            early_stopping_rounds: config.early_stopping_rounds,
            use_best_model: config.use_best_model,
            n_threads: config.n_threads as u32,
            verbosity: config.verbosity.as_str().to_string(),
            log_period: config.log_period as u32,
        }
    }
}

impl TryFrom<ConfigPayload> for GBDTConfig {
    type Error = DeserializeError;

    fn try_from(payload: ConfigPayload) -> Result<Self, Self::Error> {
        let objective = Objective::from_name(&payload.objective)
            .ok_or_else(|| invalid(format!("unknown objective `{}`", payload.objective)))?;
        let metric = match payload.metric {
            None => None,
            Some(name) => {
                Some(Metric::from_name(&name).ok_or_else(|| invalid(format!("unknown metric `{name}`")))?)
            }
        };
        let verbosity = Verbosity::from_name(&payload.verbosity)
            .ok_or_else(|| invalid(format!("unknown verbosity `{}`", payload.verbosity)))?;

        GBDTConfig::builder()
            .objective(objective)
            .maybe_metric(metric)
            .n_trees(payload.n_trees)
            .learning_rate(payload.learning_rate)
            .tree(TreeParams {
                growth_strategy: payload.growth_strategy.into(),
                max_onehot_cats: payload.max_onehot_cats,
            })
            .regularization(RegularizationParams {
                lambda: payload.lambda,
                alpha: payload.alpha,
                min_child_weight: payload.min_child_weight,
                min_gain: payload.min_gain,
                min_samples_leaf: payload.min_samples_leaf,
            })
            .max_bins(payload.max_bins)
            .maybe_early_stopping_rounds(payload.early_stopping_rounds)
            .use_best_model(payload.use_best_model)
            .n_threads(payload.n_threads as usize)
            .verbosity(verbosity)
            .log_period(payload.log_period as usize)
            .build()
            .map_err(|e| invalid(e.to_string()))
    }
}

// =============================================================================
// GBDTModel conversions
// =============================================================================

impl From<&GBDTModel> for PayloadV1 {
    fn from(model: &GBDTModel) -> Self {
        PayloadV1 {
            metadata: ModelMetadata::from(model.meta()),
            forest: ForestPayload::from(model.forest()),
            config: ConfigPayload::from(model.config()),
        }
    }
}

impl TryFrom<PayloadV1> for GBDTModel {
    type Error = DeserializeError;

    fn try_from(payload: PayloadV1) -> Result<Self, Self::Error> {
        let meta = ModelMeta::try_from(payload.metadata)?;
        let forest = Forest::try_from(payload.forest)?;
        let config = GBDTConfig::try_from(payload.config)?;

        let n_features = meta.n_features();
        for (tree_idx, tree) in forest.trees().enumerate() {
            if let Some(&feature) = tree
                .split_indices()
                .iter()
                .zip(tree.leaf_flags())
                .filter(|&(_, &leaf)| !leaf)
                .map(|(f, _)| f)
                .find(|&&f| f as usize >= n_features)
            {
                return Err(invalid(format!(
                    "tree {tree_idx} splits on feature {feature}, model has {n_features}"
                )));
            }
        }

        Ok(GBDTModel::from_parts(forest, meta, config))
    }
}
