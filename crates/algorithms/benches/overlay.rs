//! Benchmarks for pairwise overlay with and without the R-tree pre-filter

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use geo_types::polygon;
use geolens_algorithms::analysis::{difference, intersection};
use geolens_algorithms::{AnalysisConfig, CancellationToken};
use geolens_core::{Feature, FeatureCollection};

/// `n x n` grid of unit squares, shifted by `offset` degrees.
fn grid(n: usize, offset: f64) -> FeatureCollection {
    (0..n * n)
        .map(|i| {
            let x = (i % n) as f64 * 0.1 + offset;
            let y = (i / n) as f64 * 0.1 + offset;
            Feature::new(polygon![
                (x: x, y: y),
                (x: x + 0.1, y: y),
                (x: x + 0.1, y: y + 0.1),
                (x: x, y: y + 0.1),
                (x: x, y: y),
            ])
            .with_property("cell", i as f64)
        })
        .collect()
}

fn configs() -> [(&'static str, AnalysisConfig); 2] {
    [
        ("indexed", AnalysisConfig { parallel: false, use_spatial_index: true }),
        ("scan", AnalysisConfig { parallel: false, use_spatial_index: false }),
    ]
}

fn bench_intersection(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay/intersection");
    let cancel = CancellationToken::new();
    for n in [5, 10, 20] {
        let source = grid(n, 0.0);
        let target = grid(n, 0.05);
        for (name, config) in configs() {
            group.bench_with_input(BenchmarkId::new(name, n * n), &n, |b, _| {
                b.iter(|| intersection(black_box(&source), black_box(&target), &config, &cancel).unwrap())
            });
        }
    }
    group.finish();
}

fn bench_difference(c: &mut Criterion) {
    let mut group = c.benchmark_group("overlay/difference");
    let cancel = CancellationToken::new();
    for n in [5, 10, 20] {
        let source = grid(n, 0.0);
        let target = grid(n, 0.05);
        for (name, config) in configs() {
            group.bench_with_input(BenchmarkId::new(name, n * n), &n, |b, _| {
                b.iter(|| difference(black_box(&source), black_box(&target), &config, &cancel).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_intersection, bench_difference);
criterion_main!(benches);
