//! Synthetic data for tests and benchmarks.
//!
//! Everything here is deterministic in its `seed`.

use rand::prelude::*;
use serde_json::{Value, json};

use crate::data::Dataset;

/// Labels used for the categorical column of [`synthetic_document`].
pub const CATEGORY_LABELS: [&str; 4] = ["NN", "VB", "JJ", "RB"];

/// Generate random features in feature-major order.
///
/// Values are uniform in `[min, max]`.
pub fn random_columns(rows: usize, cols: usize, seed: u64, min: f32, max: f32) -> Vec<Vec<f32>> {
	assert!(max >= min);
	let mut rng = StdRng::seed_from_u64(seed);
	let width = max - min;
	(0..cols)
		.map(|_| (0..rows).map(|_| min + rng.r#gen::<f32>() * width).collect())
		.collect()
}

/// Regression dataset: a random linear model of the features plus uniform noise.
pub fn synthetic_regression(rows: usize, cols: usize, seed: u64, noise_amplitude: f32) -> Dataset {
	let columns = random_columns(rows, cols, seed, -1.0, 1.0);
	let mut rng = StdRng::seed_from_u64(seed ^ 0x5eed);

	let weights: Vec<f32> = (0..cols).map(|_| rng.r#gen::<f32>() * 2.0 - 1.0).collect();
	let targets: Vec<f32> = (0..rows)
		.map(|r| {
			let y: f32 = columns.iter().zip(&weights).map(|(col, w)| col[r] * w).sum();
			y + (rng.r#gen::<f32>() * 2.0 - 1.0) * noise_amplitude
		})
		.collect();

	let mut builder = Dataset::builder();
	for (i, col) in columns.into_iter().enumerate() {
		builder = builder.add_feature(&format!("f{i}"), col);
	}
	match builder.targets(targets).build() {
		Ok(dataset) => dataset,
		Err(e) => panic!("synthetic dataset is well formed: {e}"),
	}
}

/// Training document with numeric features `a`, `b` and categorical feature `c`.
///
/// `output = 2a - b + effect(c)` plus a little noise, where each label of
/// [`CATEGORY_LABELS`] has its own effect.
pub fn synthetic_document(rows: usize, seed: u64) -> Value {
	let mut rng = StdRng::seed_from_u64(seed);
	let effects = [0.0f64, 1.5, -1.0, 3.0];

	let mut a = Vec::with_capacity(rows);
	let mut b = Vec::with_capacity(rows);
	let mut c = Vec::with_capacity(rows);
	let mut output = Vec::with_capacity(rows);
	for _ in 0..rows {
		let va: f64 = rng.gen_range(0.0..10.0);
		let vb: f64 = rng.gen_range(-5.0..5.0);
		let k = rng.gen_range(0..CATEGORY_LABELS.len());
		let noise: f64 = rng.gen_range(-0.1..0.1);
		a.push(va);
		b.push(vb);
		c.push(CATEGORY_LABELS[k]);
		output.push(2.0 * va - vb + effects[k] + noise);
	}

	json!({
		"catboost_feature_order": ["a", "b"],
		"catboost_cat_feature_order": ["c"],
		"training_data": {
			"a": a,
			"b": b,
			"c": c,
			"output": output,
		}
	})
}
