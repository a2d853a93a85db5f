//! High-level model wrappers.
//!
//! - [`GBDTModel`]: tree ensemble model with training, prediction and
//!   persistence
//! - [`ModelMeta`]: training-time metadata carried with the model
//!
//! # Example
//!
//! ```no_run
//! use boostfit::data::TrainingDocument;
//! use boostfit::model::GBDTModel;
//! use boostfit::model::gbdt::GBDTConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let dataset = TrainingDocument::from_path("training.json")?.to_dataset()?;
//! let config = GBDTConfig::builder().n_trees(50).learning_rate(0.1).build()?;
//! let model = GBDTModel::train(&dataset, None, config)?;
//!
//! model.save("model.bstr")?;
//! let loaded = GBDTModel::load("model.bstr")?;
//! assert!(loaded.is_fitted());
//! # Ok(())
//! # }
//! ```

pub mod gbdt;
mod meta;

pub use gbdt::GBDTModel;
pub use meta::ModelMeta;
