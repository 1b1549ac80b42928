//! Benchmarks for ALS training and top-N scoring
//!
//! Run with: cargo bench --package factorization
//!
//! Uses a seeded synthetic matrix so runs are comparable across machines.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use factorization::{train, AlsConfig};
use interactions::InteractionMatrix;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashSet;

const USERS: usize = 2_000;
const ITEMS: usize = 500;
const PER_USER: usize = 20;

fn synthetic_matrix() -> InteractionMatrix {
    let mut rng = StdRng::seed_from_u64(7);
    let triplets = (0..USERS)
        .flat_map(|user| {
            (0..PER_USER)
                .map(|_| (user, rng.random_range(0..ITEMS), rng.random_range(1..4) as f32))
                .collect::<Vec<_>>()
        })
        .collect();
    InteractionMatrix::from_triplets(USERS, ITEMS, triplets)
}

fn bench_train(c: &mut Criterion) {
    let matrix = synthetic_matrix();
    let config = AlsConfig::new().with_factors(16).with_iterations(3);

    c.bench_function("als_train_2000x500", |b| {
        b.iter(|| train(black_box(&matrix), black_box(&config)).unwrap())
    });
}

fn bench_recommend(c: &mut Criterion) {
    let matrix = synthetic_matrix();
    let model = train(&matrix, &AlsConfig::new().with_factors(16)).expect("Failed to train model");
    let seen: HashSet<usize> = matrix
        .row(0)
        .map(|row| row.indices.iter().copied().collect())
        .unwrap_or_default();

    c.bench_function("recommend_top_20", |b| {
        b.iter(|| {
            let recs = model.recommend(black_box(0), black_box(&seen), black_box(20)).unwrap();
            black_box(recs)
        })
    });
}

criterion_group!(benches, bench_train, bench_recommend);
criterion_main!(benches);
