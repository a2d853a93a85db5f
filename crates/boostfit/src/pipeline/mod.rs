//! One-shot training pipeline behind the `train_boost` binary.
//!
//! 1. Resolve the document and model paths from the arguments
//! 2. Load the JSON training document
//! 3. Split rows into train/validation partitions with a fixed seed
//! 4. Fit the model, monitoring the validation partition
//! 5. Report and save

mod args;
mod config;
mod error;
mod run;

pub use args::{ResolvedPaths, executable_dir, resolve_paths};
pub use config::{
    DATA_EXTENSION, DEFAULT_DATA_FILE, DEFAULT_MODEL_FILE, MODEL_EXTENSION, PipelineConfig,
};
pub use error::PipelineError;
pub use run::{run, run_with_paths};
