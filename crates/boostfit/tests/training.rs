//! Model-level training behavior: quality, categorical handling, growth
//! strategies, missing values and reproducibility.

use boostfit::approx::assert_abs_diff_eq;
use boostfit::data::{Dataset, TrainingDocument};
use boostfit::model::GBDTModel;
use boostfit::model::gbdt::{GBDTConfig, RegularizationParams, TreeParams};
use boostfit::repr::gbdt::SplitType;
use boostfit::testing::{synthetic_document, synthetic_regression};
use boostfit::training::{MetricFn, Rmse, TrainError, Verbosity};
use ndarray::Array1;

fn rmse(model: &GBDTModel, dataset: &Dataset) -> f64 {
    let preds = model.predict(dataset);
    Rmse.compute(preds.view(), dataset.targets().unwrap())
}

fn baseline_rmse(dataset: &Dataset) -> f64 {
    let targets = dataset.targets().unwrap();
    let mean = targets.mean().unwrap();
    let constant = Array1::from_elem(targets.len(), mean);
    Rmse.compute(constant.view(), targets)
}

fn config(n_trees: u32) -> GBDTConfig {
    GBDTConfig::builder()
        .n_trees(n_trees)
        .learning_rate(0.1)
        .n_threads(1)
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap()
}

#[test]
fn fits_better_than_constant() {
    let train = synthetic_regression(400, 5, 42, 0.05);
    let model = GBDTModel::train(&train, None, config(50)).unwrap();

    assert!(model.is_fitted());
    assert_eq!(model.forest().n_trees(), 50);
    assert_eq!(model.meta().best_iteration, None);

    let fitted = rmse(&model, &train);
    let baseline = baseline_rmse(&train);
    assert!(fitted < baseline * 0.5, "fitted {fitted} vs baseline {baseline}");
}

#[test]
fn generalizes_to_held_out_rows() {
    let data = synthetic_regression(600, 4, 7, 0.05);
    let rows: Vec<usize> = (0..600).collect();
    let (fit_rows, hold_rows) = rows.split_at(450);
    let fit = data.take_rows(fit_rows).unwrap();
    let hold = data.take_rows(hold_rows).unwrap();

    let model = GBDTModel::train(&fit, Some(&hold), config(100)).unwrap();
    let best = model.meta().best_iteration.unwrap();
    assert_eq!(model.forest().n_trees(), best + 1);
    assert!(rmse(&model, &hold) < baseline_rmse(&hold) * 0.6);
}

#[test]
fn best_score_matches_validation_rmse() {
    let data = synthetic_regression(300, 3, 3, 0.1);
    let rows: Vec<usize> = (0..300).collect();
    let fit = data.take_rows(&rows[..225]).unwrap();
    let hold = data.take_rows(&rows[225..]).unwrap();

    let model = GBDTModel::train(&fit, Some(&hold), config(40)).unwrap();
    let best_score = model.meta().best_score.unwrap();
    assert_abs_diff_eq!(best_score, rmse(&model, &hold), epsilon = 1e-4);
}

#[test]
fn learns_categorical_effects() {
    // Six categories exceed the one-hot limit, forcing partition splits.
    let effects = [0.0f32, 4.0, -2.0, 1.0, 6.0, -5.0];
    let n = 300;
    let cats: Vec<f32> = (0..n).map(|i| (i % effects.len()) as f32).collect();
    let targets: Vec<f32> = cats.iter().map(|&c| effects[c as usize]).collect();
    let noise: Vec<f32> = (0..n).map(|i| ((i * 37) % 11) as f32).collect();

    let train = Dataset::builder()
        .add_feature("noise", noise)
        .add_categorical("cat", cats)
        .targets(targets)
        .build()
        .unwrap();

    let model = GBDTModel::train(&train, None, config(60)).unwrap();

    let first = model.forest().tree(0);
    assert_eq!(first.split_index(0), 1);
    assert_eq!(first.split_type(0), SplitType::Categorical);

    for (c, effect) in effects.iter().enumerate() {
        let pred = model.predict_row(&[0.0, c as f32]);
        assert!((pred - effect).abs() < 0.2, "category {c}: {pred} vs {effect}");
    }
}

#[test]
fn document_categories_map_to_their_labels() {
    let value = synthetic_document(400, 9);
    let document = TrainingDocument::from_json_str(&value.to_string()).unwrap();
    let dataset = document.to_dataset().unwrap();

    let model = GBDTModel::train(&dataset, None, config(150)).unwrap();
    assert!(rmse(&model, &dataset) < baseline_rmse(&dataset) * 0.3);

    let vocab = model.meta().vocab(2).unwrap();
    assert_eq!(vocab.len(), 4);
}

#[test]
fn leaf_wise_respects_max_leaves() {
    let train = synthetic_regression(300, 4, 11, 0.1);
    let config = GBDTConfig::builder()
        .n_trees(10)
        .tree(TreeParams::leaf_wise(5))
        .n_threads(1)
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();

    let model = GBDTModel::train(&train, None, config).unwrap();
    for tree in model.forest().trees() {
        assert!(tree.n_leaves() <= 5);
    }
}

#[test]
fn depth_one_trees_are_stumps() {
    let train = synthetic_regression(200, 3, 5, 0.1);
    let config = GBDTConfig::builder()
        .n_trees(5)
        .tree(TreeParams::depth_wise(1))
        .n_threads(1)
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();

    let model = GBDTModel::train(&train, None, config).unwrap();
    for tree in model.forest().trees() {
        assert_eq!(tree.n_leaves(), 2);
    }
}

#[test]
fn huge_min_gain_keeps_single_leaves() {
    let train = synthetic_regression(100, 2, 8, 0.1);
    let config = GBDTConfig::builder()
        .n_trees(3)
        .regularization(RegularizationParams {
            min_gain: 1e9,
            ..Default::default()
        })
        .n_threads(1)
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();

    let model = GBDTModel::train(&train, None, config).unwrap();
    for tree in model.forest().trees() {
        assert_eq!(tree.n_leaves(), 1);
    }
}

#[test]
fn missing_values_do_not_break_training() {
    let n = 200;
    let x: Vec<f32> = (0..n)
        .map(|i| if i % 10 == 0 { f32::NAN } else { i as f32 })
        .collect();
    let targets: Vec<f32> = (0..n).map(|i| if i % 10 == 0 { 50.0 } else { i as f32 / 10.0 }).collect();
    let train = Dataset::builder()
        .add_feature("x", x)
        .targets(targets)
        .build()
        .unwrap();

    let model = GBDTModel::train(&train, None, config(80)).unwrap();
    let missing = model.predict_row(&[f32::NAN]);
    assert!((missing - 50.0).abs() < 5.0, "missing rows predicted {missing}");
    assert!(model.predict(&train).iter().all(|p| p.is_finite()));
}

#[test]
fn thread_count_does_not_change_the_model() {
    let train = synthetic_regression(300, 6, 21, 0.1);
    let sequential = GBDTModel::train(&train, None, config(15)).unwrap();
    let parallel_config = GBDTConfig {
        n_threads: 4,
        ..config(15)
    };
    let parallel = GBDTModel::train(&train, None, parallel_config).unwrap();

    assert_eq!(sequential.forest(), parallel.forest());
}

#[test]
fn early_stopping_truncates_to_best() {
    let data = synthetic_regression(300, 3, 13, 0.5);
    let rows: Vec<usize> = (0..300).collect();
    let fit = data.take_rows(&rows[..200]).unwrap();
    let hold = data.take_rows(&rows[200..]).unwrap();

    let config = GBDTConfig::builder()
        .n_trees(2000)
        .learning_rate(0.5)
        .early_stopping_rounds(5)
        .n_threads(1)
        .verbosity(Verbosity::Silent)
        .build()
        .unwrap();

    let model = GBDTModel::train(&fit, Some(&hold), config).unwrap();
    assert!(model.meta().n_rounds < 2000);
    assert_eq!(model.forest().n_trees(), model.meta().best_iteration.unwrap() + 1);
}

#[test]
fn unlabeled_training_set_is_rejected() {
    let train = Dataset::builder().add_feature("x", vec![1.0, 2.0]).build().unwrap();
    let err = GBDTModel::train(&train, None, config(1)).unwrap_err();
    assert_eq!(err, TrainError::MissingTargets { set: "train".into() });
}
