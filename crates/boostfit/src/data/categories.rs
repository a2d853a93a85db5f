//! Category vocabularies for text-valued categorical features.
//!
//! Raw categorical cells are canonicalised to strings and mapped to dense
//! ids in first-seen order. Ids are what the engine sees (as `f32`).

use std::collections::HashMap;

use serde_json::Value;

/// Dense mapping between category labels and ids.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryVocab {
    ids: HashMap<String, u32>,
    labels: Vec<String>,
}

impl CategoryVocab {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a vocabulary from labels in id order.
    ///
    /// Duplicate labels keep their first id.
    pub fn from_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::new();
        for label in labels {
            vocab.encode_or_insert(label.into());
        }
        vocab
    }

    /// Id of `label`, inserting it if unseen.
    pub fn encode_or_insert(&mut self, label: impl Into<String>) -> u32 {
        let label = label.into();
        if let Some(&id) = self.ids.get(&label) {
            return id;
        }
        let id = self.labels.len() as u32;
        self.ids.insert(label.clone(), id);
        self.labels.push(label);
        id
    }

    /// Id of `label`, if known.
    #[inline]
    pub fn get(&self, label: &str) -> Option<u32> {
        self.ids.get(label).copied()
    }

    /// Label for `id`, if known.
    #[inline]
    pub fn label(&self, id: u32) -> Option<&str> {
        self.labels.get(id as usize).map(String::as_str)
    }

    /// Labels in id order.
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// Canonical category label of a JSON cell.
///
/// Strings are taken as-is, integers and booleans are rendered in decimal /
/// `true`/`false`. Floats with a fractional part, `null`, arrays and objects
/// have no label.
pub fn category_label(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15)
                    .map(|f| format!("{}", f as i64))
            }
        }
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
