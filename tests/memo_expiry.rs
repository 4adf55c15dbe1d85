// ==============================================
// MEMO CACHE EXPIRY TESTS (integration)
// ==============================================
//
// Wall-clock behaviour of both expiry modes and of the capacity bound.
// Timings use generous margins around the configured windows.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use memokit::prelude::*;

fn unix_nanos() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default()
}

// ==============================================
// Fixed interval
// ==============================================

mod fixed_interval {
    use super::*;

    #[test]
    fn value_is_reused_inside_the_window_and_refreshed_after() {
        let cache = MemoCache::fixed_interval(Duration::from_secs(1), |_: &&'static str| {
            Ok::<_, ()>(unix_nanos())
        });

        let first = cache.get(&"now").unwrap();
        thread::sleep(Duration::from_millis(600));
        assert_eq!(cache.get(&"now").unwrap(), first);

        thread::sleep(Duration::from_millis(600));
        let refreshed = cache.get(&"now").unwrap();
        assert!(refreshed > first);
    }

    #[test]
    fn unbounded_interval_caches_without_overflow() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = {
            let calls = calls.clone();
            MemoCache::fixed_interval(Duration::MAX, move |key: &u32| {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, ()>(*key)
            })
        };

        assert_eq!(cache.get(&1), Ok(1));
        assert_eq!(cache.get(&1), Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.peek(&1).unwrap().is_fresh_at(Instant::now()));
    }

    #[test]
    fn errors_expire_on_the_same_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = {
            let calls = calls.clone();
            MemoCache::fixed_interval(Duration::from_millis(200), move |_: &u8| {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                if n == 0 { Err("cold start") } else { Ok(n) }
            })
        };

        assert_eq!(cache.get(&0), Err("cold start"));
        assert_eq!(cache.get(&0), Err("cold start"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        thread::sleep(Duration::from_millis(300));
        assert_eq!(cache.get(&0), Ok(1));
    }

    #[test]
    fn lookup_exposes_last_good_value_after_a_failure() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = {
            let calls = calls.clone();
            MemoCache::fixed_interval(Duration::from_millis(100), move |_: &u8| {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Ok(10u32),
                    _ => Err("refresh failed"),
                }
            })
        };

        assert_eq!(cache.get(&1), Ok(10));
        thread::sleep(Duration::from_millis(150));

        let lookup = cache.lookup(&1);
        assert_eq!(lookup.result, Err("refresh failed"));
        assert_eq!(lookup.stale, Some(10));
        assert!(lookup.is_fresh_at(Instant::now()));
    }
}

// ==============================================
// Explicit expiry
// ==============================================

mod explicit_expiry {
    use super::*;

    #[test]
    fn past_expiry_refetches_and_future_expiry_caches() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = {
            let calls = calls.clone();
            MemoCache::explicit_expiry(move |key: &u32| {
                calls.fetch_add(1, Ordering::SeqCst);
                let at = if *key == 0 {
                    Instant::now() - Duration::from_millis(1)
                } else {
                    Instant::now() + Duration::from_secs(60)
                };
                Fetched::<u32, ()>::ok(*key).expires_at(at)
            })
        };

        cache.get(&0).unwrap();
        cache.get(&0).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        cache.get(&1).unwrap();
        cache.get(&1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn error_with_future_expiry_is_cached_then_retried() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = {
            let calls = calls.clone();
            MemoCache::explicit_expiry(move |_: &u32| {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 => Fetched::err("throttled").valid_for(Duration::from_millis(150)),
                    _ => Fetched::ok(7u32).valid_for(Duration::from_secs(60)),
                }
            })
        };

        assert_eq!(cache.get(&3), Err("throttled"));
        assert_eq!(cache.get(&3), Err("throttled"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        thread::sleep(Duration::from_millis(200));
        assert_eq!(cache.get(&3), Ok(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}

// ==============================================
// Capacity
// ==============================================

mod capacity {
    use super::*;

    #[test]
    fn resident_entries_stay_within_max_entries() {
        let cache = MemoCacheBuilder::new()
            .interval(Duration::from_secs(60))
            .max_entries(5)
            .build(|key: &u32| Ok::<_, ()>(*key));

        for key in 0..50 {
            assert_eq!(cache.get(&key), Ok(key));
            assert!(cache.len() <= 5);
        }
        for key in 45..50 {
            assert!(cache.contains(&key));
        }
        cache.check_invariants().unwrap();
    }

    #[test]
    fn evicted_key_is_fetched_again() {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = {
            let calls = calls.clone();
            MemoCacheBuilder::new()
                .interval(Duration::from_secs(60))
                .max_entries(2)
                .build(move |key: &u32| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, ()>(*key)
                })
        };

        cache.get(&1).unwrap();
        cache.get(&2).unwrap();
        cache.get(&3).unwrap();
        assert!(!cache.contains(&1));

        cache.get(&1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
