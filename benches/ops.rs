//! Micro-operation benchmarks for the memo cache.
//!
//! Run with: `cargo bench --bench ops`
//!
//! Measures per-operation latency (nanoseconds) for fresh hits, cold misses
//! and contended hits from several threads.

use std::hint::black_box;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use memokit::builder::MemoCacheBuilder;
use memokit::cache::MemoCache;
use memokit::fetch::Fetched;

const CAPACITY: usize = 16_384;
const OPS: u64 = 100_000;
const THREADS: usize = 4;

fn warm_cache() -> MemoCache<u64, u64, ()> {
    let cache = MemoCacheBuilder::new()
        .interval(Duration::from_secs(3600))
        .max_entries(CAPACITY)
        .build(|key: &u64| Ok::<_, ()>(key.wrapping_mul(0x9E37_79B9)));
    for key in 0..CAPACITY as u64 {
        let _ = cache.get(&key);
    }
    cache
}

// ============================================================================
// Get Hit Latency (ns/op)
// ============================================================================

fn bench_get_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("get_hit_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("fixed_interval", |b| {
        b.iter_custom(|iters| {
            let cache = warm_cache();
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    let key = i % (CAPACITY as u64);
                    let _ = black_box(cache.get(&key));
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

// ============================================================================
// Miss Latency (ns/op): fetch, link and evict
// ============================================================================

fn bench_miss(c: &mut Criterion) {
    let mut group = c.benchmark_group("miss_ns");
    group.throughput(Throughput::Elements(OPS));

    group.bench_function("fixed_interval_at_capacity", |b| {
        b.iter_custom(|iters| {
            let cache = warm_cache();
            let start = Instant::now();
            for iter in 0..iters {
                for i in 0..OPS {
                    let key = CAPACITY as u64 + iter * OPS + i;
                    let _ = black_box(cache.get(&key));
                }
            }
            start.elapsed()
        })
    });

    group.bench_function("explicit_always_stale", |b| {
        b.iter_custom(|iters| {
            let cache = MemoCache::explicit_expiry(|key: &u64| Fetched::<u64, ()>::ok(*key));
            let start = Instant::now();
            for _ in 0..iters {
                for i in 0..OPS {
                    let _ = black_box(cache.get(&(i % 64)));
                }
            }
            start.elapsed()
        })
    });

    group.finish();
}

// ============================================================================
// Contended Hits (ns/op across all threads)
// ============================================================================

fn bench_contended_hit(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_hit_ns");
    group.throughput(Throughput::Elements(OPS * THREADS as u64));

    group.bench_function("fixed_interval", |b| {
        b.iter_custom(|iters| {
            let cache = Arc::new(warm_cache());
            let start = Instant::now();
            let handles: Vec<_> = (0..THREADS)
                .map(|t| {
                    let cache = cache.clone();
                    thread::spawn(move || {
                        for _ in 0..iters {
                            for i in 0..OPS {
                                let key = (i + t as u64 * 997) % (CAPACITY as u64);
                                let _ = black_box(cache.get(&key));
                            }
                        }
                    })
                })
                .collect();
            for handle in handles {
                let _ = handle.join();
            }
            start.elapsed()
        })
    });

    group.finish();
}

criterion_group!(benches, bench_get_hit, bench_miss, bench_contended_hit);
criterion_main!(benches);
