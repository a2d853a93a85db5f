//! Categorical split storage for tree nodes.
//!
//! Categorical splits are stored as packed bitsets of the categories that go
//! LEFT. Categories not in the set (including ids never seen in training)
//! go right.

// =============================================================================
// CategoriesStorage
// =============================================================================

/// Storage for categorical split bitsets in a tree.
///
/// # Format
///
/// - `bitsets`: flat array of u32 bitset words for all nodes
/// - `segments`: per-node `(start_index, size)` into the bitset array
///
/// # Decision Rule
///
/// For a categorical split on a node with feature value `c`:
/// - If bit `c` is SET in the bitset: go LEFT
/// - If bit `c` is NOT set: go RIGHT
/// - If the feature value is NaN: use the default direction
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoriesStorage {
    bitsets: Box<[u32]>,
    /// Indexed by node. Nodes without categorical splits have `(0, 0)`.
    segments: Box<[(u32, u32)]>,
}

impl CategoriesStorage {
    #[inline]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Create categories storage from raw data.
    ///
    /// `segments` must have one entry per tree node.
    pub fn new(bitsets: Vec<u32>, segments: Vec<(u32, u32)>) -> Self {
        Self {
            bitsets: bitsets.into_boxed_slice(),
            segments: segments.into_boxed_slice(),
        }
    }

    /// Whether `category` is in the left set of `node`.
    #[inline]
    pub fn category_goes_left(&self, node_idx: u32, category: u32) -> bool {
        let Some(&(start, size)) = self.segments.get(node_idx as usize) else {
            return false;
        };
        let word_idx = category >> 5;
        if word_idx >= size {
            return false;
        }
        let word = self.bitsets[(start + word_idx) as usize];
        (word >> (category & 31)) & 1 != 0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bitsets.is_empty()
    }

    #[inline]
    pub fn segments(&self) -> &[(u32, u32)] {
        &self.segments
    }

    #[inline]
    pub fn bitsets(&self) -> &[u32] {
        &self.bitsets
    }

    /// Bitset words of one node.
    #[inline]
    pub fn bitset_for_node(&self, node_idx: u32) -> &[u32] {
        match self.segments.get(node_idx as usize) {
            Some(&(start, size)) => &self.bitsets[start as usize..(start + size) as usize],
            None => &[],
        }
    }
}

// =============================================================================
// Bitset Builder Utilities
// =============================================================================

/// Convert a categorical feature value to a category id.
///
/// Negative or fractional values have no id.
#[inline]
pub fn float_to_category(value: f32) -> Option<u32> {
    if value >= 0.0 && value == value.trunc() && value <= u32::MAX as f32 {
        Some(value as u32)
    } else {
        None
    }
}

/// Build a packed u32 bitset from a list of category ids.
///
/// Bit `i` of word `w` represents category `w * 32 + i`.
pub fn categories_to_bitset(categories: &[u32]) -> Vec<u32> {
    let Some(max_cat) = categories.iter().copied().max() else {
        return vec![];
    };
    let mut bitset = vec![0u32; ((max_cat >> 5) + 1) as usize];
    for &cat in categories {
        bitset[(cat >> 5) as usize] |= 1u32 << (cat & 31);
    }
    bitset
}

/// Expand a packed bitset back into sorted category ids.
pub fn bitset_to_categories(bitset: &[u32]) -> Vec<u32> {
    bitset
        .iter()
        .enumerate()
        .flat_map(|(w, &word)| {
            (0..32u32)
                .filter(move |bit| (word >> bit) & 1 != 0)
                .map(move |bit| (w as u32) * 32 + bit)
        })
        .collect()
}
