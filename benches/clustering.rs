//! Clustering benchmark: HDBSCAN, DBSCAN and the full consensus battery.

use botnet_detector::clustering::dbscan::dbscan;
use botnet_detector::clustering::hdbscan::{hdbscan, HdbscanParams};
use botnet_detector::config::ClusteringConfig;
use botnet_detector::EnsembleClusteringEngine;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;

/// Points in three loose groups plus scattered background, deterministic.
fn make_points(n: usize, dims: usize) -> Array2<f64> {
    Array2::from_shape_fn((n, dims), |(i, j)| {
        let center = (i % 4) as f64 * 5.0;
        let jitter = ((i * 31 + j * 17) % 13) as f64 / 13.0;
        if i % 4 == 3 {
            ((i * 7 + j * 11) % 40) as f64
        } else {
            center + jitter
        }
    })
}

fn bench_hdbscan(c: &mut Criterion) {
    let params = HdbscanParams {
        min_cluster_size: 5,
        min_samples: 2,
        cluster_selection_epsilon: 0.3,
    };
    let mut g = c.benchmark_group("hdbscan");
    for n in [50, 200] {
        let data = make_points(n, 8);
        g.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| black_box(hdbscan(black_box(data), &params)))
        });
    }
    g.finish();
}

fn bench_dbscan(c: &mut Criterion) {
    let data = make_points(200, 8);
    c.bench_function("dbscan_200x8", |b| {
        b.iter(|| black_box(dbscan(black_box(&data), 0.5, 2)))
    });
}

fn bench_ensemble(c: &mut Criterion) {
    let engine = EnsembleClusteringEngine::new(ClusteringConfig::default());
    let data = make_points(150, 8);
    c.bench_function("ensemble_battery_150x8", |b| {
        b.iter(|| black_box(engine.cluster(black_box(&data))))
    });
}

criterion_group!(benches, bench_hdbscan, bench_dbscan, bench_ensemble);
criterion_main!(benches);
