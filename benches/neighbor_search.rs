//! Criterion benchmarks for neighbor search and quantised scoring

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ndarray::Array2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use versemap_core::{top_k_neighbors, NeighborParams, QuantizedStore};

fn random_vectors(n: usize, dim: usize, seed: u64) -> Array2<f32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    Array2::from_shape_fn((n, dim), |_| rng.gen_range(-1.0f32..1.0))
}

fn benchmark_top_k(c: &mut Criterion) {
    let mut group = c.benchmark_group("top_k_neighbors");
    group.sample_size(10);

    for size in [500, 2000, 5000].iter() {
        let vectors = random_vectors(*size, 384, 42);
        group.bench_with_input(BenchmarkId::from_parameter(size), size, |b, _| {
            b.iter(|| top_k_neighbors(black_box(&vectors), NeighborParams::default()));
        });
    }

    group.finish();
}

fn benchmark_quantized_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("quantized_search");

    let vectors = random_vectors(31_102, 384, 7);
    let store = QuantizedStore::from_vectors(&vectors);
    let query = random_vectors(1, 384, 99);

    for k in [10, 50].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(k), k, |b, k| {
            b.iter(|| store.search(black_box(query.row(0)), *k));
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_top_k, benchmark_quantized_search);
criterion_main!(benches);
