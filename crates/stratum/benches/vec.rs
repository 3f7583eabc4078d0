//! Vec benchmarks
//!
//! Push throughput per strategy and the two clone paths. The arena never
//! frees, so it is left to the strategy benchmarks in `stratum-mem`.
//!
//! Run with: `cargo bench --bench vec`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stratum::{Allocator, Counting, System, Vec};

fn push_n<A: Allocator>(count: usize) -> Vec<u64, A> {
    let mut v = Vec::new();
    for i in 0..count {
        v.push(black_box(i as u64));
    }
    v
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("vec_push");

    for count in [16, 1024, 65536].iter() {
        group.bench_with_input(BenchmarkId::new("system", count), count, |b, &count| {
            b.iter(|| push_n::<System>(count));
        });
        group.bench_with_input(BenchmarkId::new("counting", count), count, |b, &count| {
            b.iter(|| push_n::<Counting>(count));
        });
        group.bench_with_input(BenchmarkId::new("std", count), count, |b, &count| {
            b.iter(|| {
                let mut v = std::vec::Vec::new();
                for i in 0..count {
                    v.push(black_box(i as u64));
                }
                v
            });
        });
    }

    group.finish();
}

fn bench_clone(c: &mut Criterion) {
    let mut group = c.benchmark_group("vec_clone");
    let source: Vec<u64> = push_n(4096);

    group.bench_function("per_element", |b| b.iter(|| black_box(&source).clone()));
    group.bench_function("bitwise", |b| b.iter(|| black_box(&source).clone_bitwise()));

    let strings: Vec<String> = (0..1024).map(|i| i.to_string()).collect();
    group.bench_function("strings", |b| b.iter(|| black_box(&strings).clone()));

    group.finish();
}

criterion_group!(benches, bench_push, bench_clone);
criterion_main!(benches);
