//! Performance benchmarks for the observable map.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use telltale::{Notify, ObservableMap};

/// Benchmark a write-plus-flush turn with varying subscriber populations.
fn bench_set_and_flush(c: &mut Criterion) {
    let mut group = c.benchmark_group("set_and_flush");

    for subscribers in [0usize, 10, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("subscribers", subscribers),
            &subscribers,
            |b, &count| {
                let store: ObservableMap<u64, u64> = ObservableMap::new();
                for i in 0..count as u64 {
                    store.subscribe_item(i % 16, Arc::new(|| {}));
                }

                let mut tick = 0u64;
                b.iter(|| {
                    store.set(tick % 16, tick, Notify::Deliver);
                    store.flush().unwrap();
                    tick += 1;
                });
            },
        );
    }

    group.finish();
}

/// Benchmark the read path over varying store sizes.
fn bench_reads(c: &mut Criterion) {
    let mut group = c.benchmark_group("reads");

    for size in [100u64, 1_000, 10_000] {
        group.bench_with_input(BenchmarkId::new("get", size), &size, |b, &size| {
            let store: ObservableMap<u64, u64> = ObservableMap::new();
            for i in 0..size {
                store.set(i, i * 2, Notify::Silent);
            }

            let mut tick = 0u64;
            b.iter(|| {
                black_box(store.get(&(tick % size)));
                tick += 1;
            });
        });

        group.bench_with_input(BenchmarkId::new("keys_where", size), &size, |b, &size| {
            let store: ObservableMap<u64, u64> = ObservableMap::new();
            for i in 0..size {
                store.set(i, i, Notify::Silent);
            }
            let pivot = size / 2;

            b.iter(|| {
                black_box(store.keys_where(|v| *v >= pivot));
            });
        });
    }

    group.finish();
}

/// Benchmark batched updates against one-by-one notifying writes.
fn bench_update_many(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_many");

    for batch in [10usize, 100, 1_000] {
        group.bench_with_input(BenchmarkId::new("batch", batch), &batch, |b, &batch| {
            let store: ObservableMap<u64, u64> = ObservableMap::new();
            for i in 0..batch as u64 {
                store.set(i, 0, Notify::Silent);
            }
            store.subscribe_filtered_keys(Arc::new(|| {}));

            b.iter(|| {
                store.update_many((0..batch as u64).map(|i| (i, i)), Notify::Deliver);
                store.flush().unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_set_and_flush, bench_reads, bench_update_many);
criterion_main!(benches);
