//! Gradient-boosted decision tree (GBDT) canonical representations.

/// Canonical node identifier used by the GBDT representation.
///
/// Internally this is just an index into the tree's SoA arrays.
pub type NodeId = u32;

pub mod categories;
pub mod forest;
pub mod mutable_tree;
pub mod node;
pub mod tree;

pub use categories::{CategoriesStorage, bitset_to_categories, categories_to_bitset, float_to_category};
pub use forest::{Forest, ForestValidationError};
pub use mutable_tree::MutableTree;
pub use node::SplitType;
pub use tree::{Tree, TreeValidationError};
