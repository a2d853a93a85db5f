//! Train a gradient-boosted regressor from a JSON training document.
//!
//! Usage:
//!   train_boost [DATA.json] [MODEL.bstr]
//!
//! Relative paths resolve against the directory holding this executable.
//! Defaults: `catboost_training_data.json` and `boost_model.bstr`.

use std::process::ExitCode;

use boostfit::pipeline::{PipelineConfig, run};

fn main() -> ExitCode {
    match run(std::env::args().skip(1), &PipelineConfig::default()) {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
