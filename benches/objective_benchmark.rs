//! Benchmarks for the logistic regression objectives and predictors
//!
//! Run with: `cargo bench --bench objective_benchmark`

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::{Array1, Array2};
use rlogreg::core::Objective;
use rlogreg::data::synthetic::seeded_blobs;
use rlogreg::math::{binary_labels, one_hot, AugmentedFeatures};
use rlogreg::objective::{MultinomialObjective, OneVsAllObjective};
use rlogreg::{multinomial_objective, one_vs_all_objective, Classifier, MultinomialModel};

const N_CLASS: usize = 10;

fn benchmark_one_vs_all(c: &mut Criterion) {
    let mut group = c.benchmark_group("One-vs-all objective");

    for per_class in [50, 200] {
        let data = seeded_blobs(N_CLASS, per_class, 1).unwrap();
        let labels = binary_labels(&data.labels, 3);
        let weights = Array1::from_elem(N_CLASS + 1, 0.01);
        let n = data.len();

        group.bench_with_input(BenchmarkId::new("free_fn", n), &n, |b, _| {
            b.iter(|| {
                black_box(one_vs_all_objective(black_box(&weights), &data.features, &labels).unwrap())
            });
        });

        let augmented = AugmentedFeatures::new(&data.features);
        let objective = OneVsAllObjective::new(&augmented, labels.clone()).unwrap();
        group.bench_with_input(BenchmarkId::new("cached_bias", n), &n, |b, _| {
            b.iter(|| black_box(objective.evaluate(black_box(&weights)).unwrap()));
        });
    }
    group.finish();
}

fn benchmark_multinomial(c: &mut Criterion) {
    let mut group = c.benchmark_group("Multinomial objective");

    for per_class in [50, 200] {
        let data = seeded_blobs(N_CLASS, per_class, 2).unwrap();
        let targets = one_hot(&data.labels, N_CLASS).unwrap();
        let params = Array1::from_elem((N_CLASS + 1) * N_CLASS, 0.01);
        let n = data.len();

        group.bench_with_input(BenchmarkId::new("free_fn", n), &n, |b, _| {
            b.iter(|| {
                black_box(
                    multinomial_objective(black_box(&params), &data.features, &targets).unwrap(),
                )
            });
        });

        let augmented = AugmentedFeatures::new(&data.features);
        let objective = MultinomialObjective::new(&augmented, targets.clone()).unwrap();
        group.bench_with_input(BenchmarkId::new("cached_bias", n), &n, |b, _| {
            b.iter(|| black_box(objective.evaluate(black_box(&params)).unwrap()));
        });
    }
    group.finish();
}

fn benchmark_predict(c: &mut Criterion) {
    let data = seeded_blobs(N_CLASS, 500, 3).unwrap();
    let model = MultinomialModel::new(Array2::from_elem((N_CLASS + 1, N_CLASS), 0.01)).unwrap();

    c.bench_function("multinomial_predict_5000", |b| {
        b.iter(|| black_box(model.predict(black_box(&data.features)).unwrap()));
    });
}

criterion_group!(
    benches,
    benchmark_one_vs_all,
    benchmark_multinomial,
    benchmark_predict
);
criterion_main!(benches);
