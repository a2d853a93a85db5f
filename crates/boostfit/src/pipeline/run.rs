//! The one-shot training run: load, split, fit, save.

use serde_json::Value;

use super::args::{ResolvedPaths, executable_dir, resolve_paths};
use super::config::PipelineConfig;
use super::error::PipelineError;
use crate::data::{TrainingDocument, train_valid_split};
use crate::model::GBDTModel;

/// Run the pipeline for command-line arguments (program name excluded).
///
/// Relative paths resolve against the directory of the running executable.
pub fn run<I, S>(args: I, config: &PipelineConfig) -> Result<GBDTModel, PipelineError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let base_dir = executable_dir().map_err(PipelineError::Location)?;
    let paths = resolve_paths(args, &base_dir, config);
    run_with_paths(&paths, config)
}

/// Run the pipeline on already resolved paths.
///
/// Prints the fit status, the resolved parameters and `saved` on stdout.
/// The model file is only written once training has succeeded.
pub fn run_with_paths(paths: &ResolvedPaths, config: &PipelineConfig) -> Result<GBDTModel, PipelineError> {
    let document = TrainingDocument::from_path(&paths.data_path)?;
    let dataset = document.to_dataset()?;

    let split = train_valid_split(dataset.n_samples(), config.valid_fraction, config.seed)?;
    let (train, valid) = split.apply(&dataset)?;

    let model = GBDTModel::train(&train, Some(&valid), config.gbdt_config()?)?;

    println!("Model is fitted: {}", model.is_fitted());
    let params = Value::Object(model.params().into_iter().collect());
    println!("Model params:\n{params:#}");

    model.save(&paths.model_path).map_err(|source| PipelineError::Save {
        path: paths.model_path.clone(),
        source,
    })?;
    println!("saved");

    Ok(model)
}
