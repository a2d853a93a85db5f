//! Training throughput: binning, the boosting loop and the full model path.

use std::time::Duration;

use boostfit::data::BinnedDataset;
use boostfit::model::GBDTModel;
use boostfit::model::gbdt::{GBDTConfig, TreeParams};
use boostfit::testing::synthetic_regression;
use boostfit::training::{GBDTParams, GBDTTrainer, GrowthStrategy, Rmse, SquaredLoss, Verbosity};
use boostfit::utils::Parallelism;

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .warm_up_time(Duration::from_secs(3))
        .measurement_time(Duration::from_secs(15))
        .sample_size(10)
}

fn bench_binning(c: &mut Criterion) {
    let mut group = c.benchmark_group("train/binning");
    for rows in [10_000usize, 100_000] {
        let dataset = synthetic_regression(rows, 20, 42, 0.05);
        group.throughput(Throughput::Elements((rows * 20) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(rows), &dataset, |b, ds| {
            b.iter(|| black_box(BinnedDataset::from_dataset(black_box(ds), 254, Parallelism::Parallel)))
        });
    }
    group.finish();
}

fn bench_boosting(c: &mut Criterion) {
    let mut group = c.benchmark_group("train/boosting");
    let dataset = synthetic_regression(50_000, 50, 42, 0.05);
    let binned = BinnedDataset::from_dataset(&dataset, 254, Parallelism::Parallel);
    let targets = dataset.targets().expect("synthetic data has targets");

    for (name, growth_strategy) in [
        ("depthwise_6", GrowthStrategy::DepthWise { max_depth: 6 }),
        ("leafwise_31", GrowthStrategy::LeafWise { max_leaves: 31 }),
    ] {
        let params = GBDTParams {
            n_trees: 20,
            learning_rate: 0.1,
            growth_strategy,
            verbosity: Verbosity::Silent,
            ..Default::default()
        };
        let trainer = GBDTTrainer::new(SquaredLoss, Rmse, params);
        for parallelism in [Parallelism::Sequential, Parallelism::Parallel] {
            let id = BenchmarkId::new(name, format!("{parallelism:?}"));
            group.bench_function(id, |b| {
                b.iter(|| {
                    let outcome = trainer
                        .train(black_box(&binned), targets, &[], parallelism)
                        .expect("training succeeds");
                    black_box(outcome)
                })
            });
        }
    }
    group.finish();
}

fn bench_model_with_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("train/model");
    let dataset = synthetic_regression(20_000, 10, 7, 0.1);
    let split = boostfit::data::train_valid_split(dataset.n_samples(), 0.25, 1).expect("valid split");
    let (train, valid) = split.apply(&dataset).expect("split rows");

    let config = GBDTConfig::builder()
        .n_trees(50)
        .learning_rate(0.03)
        .tree(TreeParams::depth_wise(6))
        .verbosity(Verbosity::Silent)
        .build()
        .expect("valid config");

    group.bench_function("gbdt_50_trees_valid", |b| {
        b.iter(|| {
            let model = GBDTModel::train(black_box(&train), Some(&valid), config.clone()).expect("training succeeds");
            black_box(model)
        })
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = default_criterion();
    targets = bench_binning, bench_boosting, bench_model_with_validation
}
criterion_main!(benches);
