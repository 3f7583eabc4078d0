//! Allocator strategy benchmarks.
//!
//! Compares a single small alloc/free round trip across strategies and the
//! cost of many small arena allocations.

use std::alloc::Layout;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use stratum_mem::{Allocator, Arena, Counting, System};

fn round_trip<A: Allocator>() {
    let ptr = A::alloc(black_box(Layout::new::<[u64; 4]>()));
    unsafe { A::free(black_box(ptr)) };
}

fn bench_round_trip(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_free");
    group.bench_function("system", |b| b.iter(round_trip::<System>));
    group.bench_function("counting_system", |b| b.iter(round_trip::<Counting<System>>));
    group.bench_function("arena", |b| b.iter(round_trip::<Arena>));
    group.finish();
}

fn bench_arena_burst(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena_burst");

    for count in [16, 256, 4096].iter() {
        group.bench_with_input(BenchmarkId::from_parameter(count), count, |b, &count| {
            b.iter(|| {
                for _ in 0..count {
                    black_box(Arena::alloc(Layout::new::<u32>()));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_round_trip, bench_arena_burst);
criterion_main!(benches);
