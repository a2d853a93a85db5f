//! End-to-end tests of the load → split → fit → save pipeline.

use std::fs;
use std::path::Path;

use boostfit::data::DocumentError;
use boostfit::model::GBDTModel;
use boostfit::pipeline::{PipelineConfig, PipelineError, ResolvedPaths, resolve_paths, run, run_with_paths};
use boostfit::testing::synthetic_document;
use boostfit::training::Verbosity;
use serde_json::{Value, json};

/// Pipeline defaults with fewer rounds so the suite stays fast.
fn fast_config() -> PipelineConfig {
    PipelineConfig {
        n_trees: 200,
        n_threads: 1,
        verbosity: Verbosity::Silent,
        ..Default::default()
    }
}

fn write_document(dir: &Path, value: &Value) -> ResolvedPaths {
    let config = PipelineConfig::default();
    let paths = resolve_paths(["train.json", "model.bstr"], dir, &config);
    fs::write(&paths.data_path, value.to_string()).unwrap();
    paths
}

#[test]
fn trains_and_saves_reloadable_model() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_document(dir.path(), &synthetic_document(100, 11));

    let model = run_with_paths(&paths, &fast_config()).unwrap();
    assert!(model.is_fitted());

    let loaded = GBDTModel::load(&paths.model_path).unwrap();
    assert!(loaded.is_fitted());
    assert_eq!(loaded, model);

    // Columns are numeric first, then categorical.
    assert_eq!(loaded.meta().feature_names(), vec!["a", "b", "c"]);
    assert_eq!(loaded.meta().schema.categorical_indices(), vec![2]);
    // The validation partition drives best-iteration selection.
    let best = loaded.meta().best_iteration.unwrap();
    assert_eq!(loaded.forest().n_trees(), best + 1);
}

#[test]
fn reported_params_follow_pipeline_config() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_document(dir.path(), &synthetic_document(40, 5));

    let config = PipelineConfig {
        learning_rate: 0.1,
        ..fast_config()
    };
    let model = run_with_paths(&paths, &config).unwrap();

    let params = model.params();
    assert_eq!(params["n_trees"], json!(200));
    assert_eq!(params["learning_rate"].to_string(), "0.1");
    assert_eq!(params["use_best_model"], json!(true));
    assert_eq!(params["objective"], json!("squared"));
}

#[test]
fn default_learning_rate_prints_as_configured() {
    let params = PipelineConfig::default().gbdt_config().unwrap().to_params();
    assert_eq!(params["learning_rate"].to_string(), "0.03");
    assert_eq!(params["n_trees"], json!(8000));

    let rendered = serde_json::to_string_pretty(&params).unwrap();
    assert!(rendered.contains("\"learning_rate\": 0.03,"), "{rendered}");
}

#[test]
fn missing_output_fails_without_writing_model() {
    let dir = tempfile::tempdir().unwrap();
    let mut document = synthetic_document(100, 11);
    document["training_data"].as_object_mut().unwrap().remove("output");
    let paths = write_document(dir.path(), &document);

    let err = run_with_paths(&paths, &fast_config()).unwrap_err();
    assert!(
        matches!(err, PipelineError::Document(DocumentError::MissingColumn(ref c)) if c == "output"),
        "got: {err:?}"
    );
    assert!(!paths.model_path.exists());
}

#[test]
fn length_mismatch_fails_before_fitting() {
    let dir = tempfile::tempdir().unwrap();
    let mut document = synthetic_document(100, 11);
    document["training_data"]["b"].as_array_mut().unwrap().pop();
    let paths = write_document(dir.path(), &document);

    let err = run_with_paths(&paths, &fast_config()).unwrap_err();
    assert!(
        matches!(
            err,
            PipelineError::Document(DocumentError::LengthMismatch { expected: 100, actual: 99, .. })
        ),
        "got: {err:?}"
    );
    assert!(!paths.model_path.exists());
}

#[test]
fn missing_data_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = resolve_paths(["absent.json"], dir.path(), &PipelineConfig::default());

    let err = run_with_paths(&paths, &fast_config()).unwrap_err();
    assert!(matches!(err, PipelineError::Document(DocumentError::Io { .. })), "got: {err:?}");
}

#[test]
fn malformed_json_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let paths = resolve_paths(["broken.json"], dir.path(), &PipelineConfig::default());
    fs::write(&paths.data_path, "{ \"catboost_feature_order\": [").unwrap();

    let err = run_with_paths(&paths, &fast_config()).unwrap_err();
    assert!(matches!(err, PipelineError::Document(DocumentError::Parse(_))), "got: {err:?}");
}

#[test]
fn null_target_fails_training() {
    let dir = tempfile::tempdir().unwrap();
    let mut document = synthetic_document(20, 2);
    document["training_data"]["output"][3] = Value::Null;
    let paths = write_document(dir.path(), &document);

    let err = run_with_paths(&paths, &fast_config()).unwrap_err();
    assert!(matches!(err, PipelineError::Train(_)), "got: {err:?}");
    assert!(!paths.model_path.exists());
}

#[test]
fn rerun_overwrites_model_file() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_document(dir.path(), &synthetic_document(100, 11));
    fs::write(&paths.model_path, b"stale bytes that are not a model").unwrap();

    run_with_paths(&paths, &fast_config()).unwrap();
    let first = fs::read(&paths.model_path).unwrap();
    run_with_paths(&paths, &fast_config()).unwrap();
    let second = fs::read(&paths.model_path).unwrap();

    // Same seed, same data: the rewrite is byte-identical.
    assert_eq!(first, second);
    assert!(GBDTModel::from_bytes(&second).is_ok());
}

#[test]
fn unwritable_output_is_save_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_document(dir.path(), &synthetic_document(30, 4));
    paths.model_path = dir.path().join("no_such_dir").join("model.bstr");

    let err = run_with_paths(&paths, &fast_config()).unwrap_err();
    assert!(matches!(err, PipelineError::Save { .. }), "got: {err:?}");
}

#[test]
fn too_few_rows_fail_to_split() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_document(dir.path(), &synthetic_document(1, 4));

    let err = run_with_paths(&paths, &fast_config()).unwrap_err();
    assert!(matches!(err, PipelineError::Split(_)), "got: {err:?}");
}

#[test]
fn run_accepts_absolute_argument_paths() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_document(dir.path(), &synthetic_document(60, 3));
    let data = paths.data_path.to_str().unwrap();
    let model = paths.model_path.to_str().unwrap();

    let fitted = run(["--ignored", data, model], &fast_config()).unwrap();
    assert!(fitted.is_fitted());
    assert_eq!(GBDTModel::load(&paths.model_path).unwrap(), fitted);
}
