//! Fixed settings of the one-shot training run.

use crate::model::gbdt::{ConfigError, GBDTConfig};
use crate::training::Verbosity;

/// Default training document, relative to the executable's directory.
pub const DEFAULT_DATA_FILE: &str = "catboost_training_data.json";

/// Default model output file, relative to the executable's directory.
pub const DEFAULT_MODEL_FILE: &str = "boost_model.bstr";

/// Argument suffix selecting the training document.
pub const DATA_EXTENSION: &str = ".json";

/// Argument suffix selecting the model output file.
pub const MODEL_EXTENSION: &str = ".bstr";

/// Settings of [`run`](super::run).
///
/// [`PipelineConfig::default`] is the command-line contract: fixed seed,
/// 25% validation rows, 8000 rounds at learning rate 0.03.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub default_data_file: String,
    pub default_model_file: String,
    /// Seed of the train/validation shuffle.
    pub seed: u64,
    /// Fraction of rows held out for validation.
    pub valid_fraction: f64,
    pub n_trees: u32,
    pub learning_rate: f32,
    /// Engine thread count: 0 = auto, 1 = sequential.
    pub n_threads: usize,
    pub verbosity: Verbosity,
    /// Log training metrics every `log_period` rounds.
    pub log_period: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_data_file: DEFAULT_DATA_FILE.to_string(),
            default_model_file: DEFAULT_MODEL_FILE.to_string(),
            seed: 1,
            valid_fraction: 0.25,
            n_trees: 8000,
            learning_rate: 0.03,
            n_threads: 0,
            verbosity: Verbosity::Info,
            log_period: 1,
        }
    }
}

impl PipelineConfig {
    /// Engine configuration for the fit.
    pub fn gbdt_config(&self) -> Result<GBDTConfig, ConfigError> {
        GBDTConfig::builder()
            .n_trees(self.n_trees)
            .learning_rate(self.learning_rate)
            .n_threads(self.n_threads)
            .verbosity(self.verbosity)
            .log_period(self.log_period)
            .build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_contract() {
        let config = PipelineConfig::default();
        assert_eq!(config.seed, 1);
        assert_eq!(config.valid_fraction, 0.25);
        assert_eq!(config.default_data_file, "catboost_training_data.json");

        let gbdt = config.gbdt_config().unwrap();
        assert_eq!(gbdt.n_trees, 8000);
        assert!((gbdt.learning_rate - 0.03).abs() < 1e-7);
        assert!(gbdt.use_best_model);
        assert_eq!(gbdt.early_stopping_rounds, None);
    }

    #[test]
    fn invalid_engine_settings_are_reported() {
        let config = PipelineConfig {
            learning_rate: 0.0,
            ..Default::default()
        };
        assert!(config.gbdt_config().is_err());
    }
}
