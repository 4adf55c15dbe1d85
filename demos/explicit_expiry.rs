//! Fetch functions that decide how long each answer stays valid.
//!
//! Run with: cargo run --example explicit_expiry

use std::sync::atomic::{AtomicU32, Ordering};
use std::thread;
use std::time::Duration;

use memokit::prelude::*;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Memo Cache: explicit expiry ===\n");

    let attempts = AtomicU32::new(0);
    let cache = MemoCache::explicit_expiry(move |zone: &String| {
        let attempt = attempts.fetch_add(1, Ordering::SeqCst);
        if attempt == 0 {
            // back off briefly on the first failure
            return Fetched::err(format!("{zone}: upstream timeout"))
                .valid_for(Duration::from_millis(300));
        }
        Fetched::ok(format!("{zone} -> 10.0.0.{attempt}")).valid_for(Duration::from_secs(5))
    });

    let zone = "internal.example".to_string();

    println!("1. First fetch fails and the error is held for 300ms");
    println!("   {:?}", cache.get(&zone));
    println!("   {:?}", cache.get(&zone));
    println!();

    println!("2. After the back-off the fetch is retried");
    thread::sleep(Duration::from_millis(350));
    let lookup = cache.lookup(&zone);
    println!("   {:?}", lookup.result);
    println!("   fresh for another ~5s: {}", lookup.is_fresh_at(std::time::Instant::now()));
    println!();

    println!("3. Peek never fetches");
    println!("   {:?}", cache.peek(&"unknown.example".to_string()).map(|l| l.result));
}
