//! Memoizing a slow lookup with a fixed refresh interval.
//!
//! Run with: cargo run --example basic_memo

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use memokit::prelude::*;

fn slow_square(n: &u64) -> Result<u64, String> {
    thread::sleep(Duration::from_millis(200));
    n.checked_mul(*n).ok_or_else(|| format!("{n} squared overflows"))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Memo Cache: fixed interval ===\n");

    let cache = Arc::new(
        MemoCacheBuilder::new()
            .interval(Duration::from_secs(2))
            .max_entries(3)
            .build(slow_square),
    );

    println!("1. Cold get, then warm get");
    let start = Instant::now();
    println!("   get(12) = {:?} in {:?}", cache.get(&12), start.elapsed());
    let start = Instant::now();
    println!("   get(12) = {:?} in {:?}", cache.get(&12), start.elapsed());
    println!();

    println!("2. Eight threads asking for the same cold key");
    let start = Instant::now();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let cache = cache.clone();
            thread::spawn(move || cache.get(&99))
        })
        .collect();
    for handle in handles {
        let _ = handle.join();
    }
    println!("   all answered in {:?} (one fetch)", start.elapsed());
    println!();

    println!("3. Errors are cached too");
    println!("   get(u64::MAX) = {:?}", cache.get(&u64::MAX));
    let start = Instant::now();
    println!("   again         = {:?} in {:?}", cache.get(&u64::MAX), start.elapsed());
    println!();

    println!("4. Capacity of 3 keeps the most recently fetched keys");
    for key in [1, 2, 3] {
        let _ = cache.get(&key);
    }
    println!("   resident: {}", cache.len());
    println!("   contains 12? {}", cache.contains(&12));
    println!("   contains 3?  {}", cache.contains(&3));
    println!();

    println!("5. After the interval the value is fetched again");
    thread::sleep(Duration::from_millis(2100));
    let start = Instant::now();
    println!("   get(3) = {:?} in {:?}", cache.get(&3), start.elapsed());
}
