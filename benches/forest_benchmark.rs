//! Benchmark random forest training and the full classifier pipeline
//!
//! Run with: cargo bench --bench forest_benchmark

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::prelude::*;
use rand::SeedableRng;

use markscope::pipeline::{
    derive_averages, run_classifier, student_records, Classifier, ClassifierConfig,
    FeatureMatrix, ForestConfig, Grade, RandomForest, StandardScaler, FEATURE_NAMES,
};

/// Synthetic students whose grade follows the mean of the first three features
fn generate_matrix(n_rows: usize, seed: u64) -> (FeatureMatrix, Vec<Grade>) {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);

    let mut rows = Vec::with_capacity(n_rows);
    let mut labels = Vec::with_capacity(n_rows);
    for _ in 0..n_rows {
        let row: Vec<f64> = vec![
            rng.gen_range(30.0..100.0),
            rng.gen_range(30.0..100.0),
            rng.gen_range(30.0..100.0),
            rng.gen_range(60.0..100.0),
            rng.gen_range(0.0..9.0),
        ];
        let mean = (row[0] + row[1] + row[2]) / 3.0;
        labels.push(match mean {
            m if m >= 85.0 => Grade::A,
            m if m >= 65.0 => Grade::B,
            m if m >= 45.0 => Grade::C,
            _ => Grade::D,
        });
        rows.push(row);
    }

    let names = FEATURE_NAMES.iter().map(|s| s.to_string()).collect();
    (FeatureMatrix::new(names, rows).unwrap(), labels)
}

/// Forest fit time as the training set grows
fn benchmark_fit_by_rows(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_fit_by_rows");
    group.sample_size(20);

    for n_rows in [15, 100, 500, 2_000] {
        let (x, y) = generate_matrix(n_rows, 42);
        group.throughput(Throughput::Elements(n_rows as u64));

        group.bench_with_input(BenchmarkId::new("100_trees", n_rows), &(&x, &y), |b, (x, y)| {
            b.iter(|| {
                let mut forest = RandomForest::new(ForestConfig::default());
                let _ = forest.fit(black_box(*x), black_box(*y));
            });
        });
    }

    group.finish();
}

/// Forest fit time as the tree count grows
fn benchmark_fit_by_trees(c: &mut Criterion) {
    let mut group = c.benchmark_group("forest_fit_by_trees");
    group.sample_size(20);

    let (x, y) = generate_matrix(500, 7);
    for n_trees in [10, 50, 100, 250] {
        group.bench_with_input(BenchmarkId::new("500_rows", n_trees), &n_trees, |b, &n_trees| {
            b.iter(|| {
                let mut forest = RandomForest::new(ForestConfig {
                    n_trees,
                    ..ForestConfig::default()
                });
                let _ = forest.fit(black_box(&x), black_box(&y));
            });
        });
    }

    group.finish();
}

/// Split, scale, fit and evaluate over the fixed class
fn benchmark_class_pipeline(c: &mut Criterion) {
    let records = derive_averages(&student_records());
    let config = ClassifierConfig::default();

    c.bench_function("class_pipeline_default", |b| {
        b.iter(|| {
            let mut forest = RandomForest::new(config.forest_config());
            let _ = run_classifier(
                black_box(&records),
                black_box(&config),
                &mut forest,
                &StandardScaler,
            );
        });
    });
}

criterion_group!(
    benches,
    benchmark_fit_by_rows,
    benchmark_fit_by_trees,
    benchmark_class_pipeline,
);
criterion_main!(benches);
