//! Payload structures for the native storage format.
//!
//! These structs are designed for serialization with Postcard. They mirror
//! the runtime types in a flat, self-describing layout.

use serde::{Deserialize, Serialize};

// ============================================================================
// Top-Level Payload
// ============================================================================

/// Version-tagged payload enum.
///
/// New format versions add new variants rather than modifying existing ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    V1(PayloadV1),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadV1 {
    pub metadata: ModelMetadata,
    pub forest: ForestPayload,
    pub config: ConfigPayload,
}

// ============================================================================
// Metadata
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub features: Vec<FeaturePayload>,
    pub n_rounds: u32,
    pub best_iteration: Option<u32>,
    pub best_score: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePayload {
    pub name: Option<String>,
    pub kind: FeatureKindPayload,
    /// Category labels in id order, for text-valued categorical features.
    pub vocab: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeatureKindPayload {
    Numeric,
    Categorical,
}

// ============================================================================
// Forest
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestPayload {
    pub base_score: f32,
    pub trees: Vec<TreePayload>,
}

/// Single decision tree in structure-of-arrays layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreePayload {
    pub num_nodes: u32,
    pub split_features: Vec<u32>,
    /// One per node; 0.0 for categorical splits and leaves.
    pub thresholds: Vec<f32>,
    pub left_children: Vec<u32>,
    pub right_children: Vec<u32>,
    pub default_left: Vec<bool>,
    pub is_leaf: Vec<bool>,
    pub leaf_values: Vec<f32>,
    /// 0 = numeric, 1 = categorical.
    pub split_types: Vec<u8>,
    pub gains: Vec<f32>,
    pub covers: Vec<f32>,
    pub categories: CategoriesPayload,
}

/// Left-going category sets of the categorical nodes of one tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoriesPayload {
    pub node_indices: Vec<u32>,
    pub category_sets: Vec<Vec<u32>>,
}

// ============================================================================
// Config
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigPayload {
    pub objective: String,
    pub metric: Option<String>,
    pub n_trees: u32,
    pub learning_rate: f32,
    pub growth_strategy: GrowthStrategyPayload,
    pub max_onehot_cats: u32,
    pub lambda: f32,
    pub alpha: f32,
    pub min_child_weight: f32,
    pub min_gain: f32,
    pub min_samples_leaf: u32,
    pub max_bins: u32,
    pub early_stopping_rounds: Option<u32>,
    pub use_best_model: bool,
    pub n_threads: u32,
    pub verbosity: String,
    pub log_period: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthStrategyPayload {
    DepthWise { max_depth: u32 },
    LeafWise { max_leaves: u32 },
}
