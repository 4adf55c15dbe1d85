//! # Trait seams
//!
//! ```text
//!   ┌──────────────────────────────┐        ┌──────────────────────────────┐
//!   │      Fetcher<K, V, E>        │        │     MemoizedCache<K, V, E>   │
//!   │                              │        │                              │
//!   │  fetch(&K) → Fetched<V, E>   │◄───────│  get(&K) → Result<V, E>      │
//!   │                              │ calls  │  remove(&K) → bool           │
//!   │  Send + Sync                 │        │  len() / is_empty()          │
//!   └──────────────────────────────┘        └──────────────┬───────────────┘
//!                                                          │
//!                                           ┌──────────────▼───────────────┐
//!                                           │ ConcurrentCache: Send + Sync │
//!                                           └──────────────────────────────┘
//! ```
//!
//! | Trait            | Purpose                                           |
//! |------------------|---------------------------------------------------|
//! | `Fetcher`        | The computation a cache memoizes                  |
//! | `MemoizedCache`  | Read-through access shared by cache types         |
//! | `ConcurrentCache`| Marker for caches safe to share between threads   |
//!
//! Any `Fn(&K) -> Fetched<V, E> + Send + Sync` is a `Fetcher`. For closures
//! returning a plain `Result`, wrap them in
//! [`FromResult`](crate::fetch::FromResult).
//!
//! ```
//! use std::time::{Duration, Instant};
//!
//! use memokit::fetch::Fetched;
//! use memokit::traits::Fetcher;
//!
//! struct Resolver;
//!
//! impl Fetcher<String, Vec<u8>, String> for Resolver {
//!     fn fetch(&self, host: &String) -> Fetched<Vec<u8>, String> {
//!         if host.is_empty() {
//!             return Fetched::err("empty host".to_string());
//!         }
//!         Fetched::ok(vec![127, 0, 0, 1]).expires_at(Instant::now() + Duration::from_secs(30))
//!     }
//! }
//!
//! assert!(Resolver.fetch(&"localhost".to_string()).result.is_ok());
//! ```

use crate::fetch::Fetched;

/// Computes the value for a key. Invoked at most once at a time per key.
pub trait Fetcher<K, V, E>: Send + Sync {
    fn fetch(&self, key: &K) -> Fetched<V, E>;
}

impl<K, V, E, F> Fetcher<K, V, E> for F
where
    F: Fn(&K) -> Fetched<V, E> + Send + Sync,
{
    #[inline]
    fn fetch(&self, key: &K) -> Fetched<V, E> {
        self(key)
    }
}

/// Read-through cache access.
///
/// ```
/// use std::time::Duration;
///
/// use memokit::cache::MemoCache;
/// use memokit::traits::MemoizedCache;
///
/// fn warm<C: MemoizedCache<u32, u32, ()>>(cache: &C, keys: &[u32]) -> usize {
///     keys.iter().filter(|key| cache.get(key).is_ok()).count()
/// }
///
/// let cache = MemoCache::fixed_interval(Duration::from_secs(60), |key: &u32| Ok::<_, ()>(key + 1));
/// assert_eq!(warm(&cache, &[1, 2, 3]), 3);
/// assert_eq!(cache.len(), 3);
/// ```
pub trait MemoizedCache<K, V, E> {
    /// Returns the cached result for `key`, fetching it if missing or stale.
    fn get(&self, key: &K) -> Result<V, E>;

    /// Drops `key`; the next `get` fetches afresh. Returns whether it was resident.
    fn remove(&self, key: &K) -> bool;

    /// Number of resident entries, fresh or stale.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Marker trait for caches that can be shared across threads.
///
/// ```
/// use memokit::cache::MemoCache;
/// use memokit::traits::ConcurrentCache;
///
/// fn assert_shareable<C: ConcurrentCache>() {}
/// assert_shareable::<MemoCache<String, u64, String>>();
/// ```
pub trait ConcurrentCache: Send + Sync {}
