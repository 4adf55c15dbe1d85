//! Single-flight memoizing cache with expiry windows and bounded recency eviction.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          MemoCache<K, V, E>                          │
//!   │                                                                      │
//!   │   map: DashMap<K, Arc<Entry>>          list: Mutex<EvictionList<K>>  │
//!   │   ┌──────┬───────────────────┐         front                  back   │
//!   │   │ key  │ Arc<Entry>        │         [k3] ◄──► [k1] ◄──► [k2]      │
//!   │   ├──────┼───────────────────┤          ▲                      │     │
//!   │   │ k1   │ result, expire_at │          │ successful fetch     │     │
//!   │   │ k2   │ result, expire_at │          │ moves key here       ▼     │
//!   │   │ k3   │ result, expire_at │                         eviction pass │
//!   │   └──────┴───────────────────┘                                       │
//!   │                                                                      │
//!   │   fetcher: Box<dyn Fetcher>   mode: ExpiryMode   max_entries: Atomic │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Get flow
//!
//! ```text
//!   get(key)
//!     │
//!     ├─ map hit and expire_at > now ──────────────────────► return (fast path)
//!     │
//!     ├─ get-or-create entry; creator links key at list front
//!     ├─ single flight: one caller fetches, the rest wait for it to land
//!     │     └─ success only: move key to list front
//!     ├─ eviction pass over the list tail
//!     └─ return the entry's result
//! ```
//!
//! ## Eviction pass
//!
//! Repeats until neither rule applies:
//!
//! 1. list longer than `max_entries` → drop the oldest key with no fetch in
//!    flight, fresh or not;
//! 2. oldest key expired at the caller's start instant and not being fetched
//!    → drop it.
//!
//! A key with a fetch in flight is never dropped by the pass, so while every
//! old key is busy the list may sit above `max_entries`. Expired keys away
//! from the tail stay resident until they reach the tail or are refreshed by
//! a `get`.
//!
//! ## Lock ordering
//!
//! `list` mutex → map shard → entry locks. The fast path takes only a shard
//! read lock and the entry's record read lock. The fetch function runs with
//! no lock held.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//!
//! use memokit::cache::MemoCache;
//!
//! let cache = MemoCache::fixed_interval(Duration::from_secs(30), |host: &String| {
//!     if host.ends_with(".invalid") {
//!         Err(format!("cannot resolve {host}"))
//!     } else {
//!         Ok(host.len())
//!     }
//! });
//!
//! assert_eq!(cache.get(&"example.com".to_string()), Ok(11));
//! assert!(cache.get(&"nowhere.invalid".to_string()).is_err());
//! assert_eq!(cache.len(), 2);
//!
//! assert!(cache.remove(&"example.com".to_string()));
//! assert_eq!(cache.len(), 1);
//! ```

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry as MapEntry;
use parking_lot::Mutex;
use rustc_hash::FxBuildHasher;
use tracing::{debug, trace, warn};

use crate::config::{CacheConfig, ExpiryMode};
use crate::ds::EvictionList;
use crate::entry::{Entry, Lookup};
use crate::error::{ConfigError, InvariantError};
use crate::fetch::{Fetched, FromResult};
use crate::traits::{ConcurrentCache, Fetcher, MemoizedCache};

/// Thread-safe read-through cache around a [`Fetcher`].
///
/// `V` and `E` are cloned out to every caller; wrap large values in `Arc`.
pub struct MemoCache<K, V, E> {
    map: DashMap<K, Arc<Entry<V, E>>, FxBuildHasher>,
    list: Mutex<EvictionList<K>>,
    fetcher: Box<dyn Fetcher<K, V, E>>,
    mode: ExpiryMode,
    max_entries: AtomicUsize,
}

impl<K, V, E> MemoCache<K, V, E>
where
    K: Clone + Eq + Hash,
    V: Clone,
    E: Clone,
{
    /// Creates a cache from a validated config and a fetcher.
    ///
    /// # Panics
    ///
    /// Panics if `config` is invalid. See [`try_new`](Self::try_new).
    pub fn new(config: CacheConfig, fetcher: impl Fetcher<K, V, E> + 'static) -> Self {
        match Self::try_new(config, fetcher) {
            Ok(cache) => cache,
            Err(e) => panic!("{}", e),
        }
    }

    /// Creates a cache, returning an error on invalid configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_entries` is zero or the fixed interval
    /// is zero.
    pub fn try_new(
        config: CacheConfig,
        fetcher: impl Fetcher<K, V, E> + 'static,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            map: DashMap::with_capacity_and_hasher(config.max_entries, FxBuildHasher),
            list: Mutex::new(EvictionList::with_capacity(config.max_entries)),
            fetcher: Box::new(fetcher),
            mode: config.mode,
            max_entries: AtomicUsize::new(config.max_entries),
        })
    }

    /// Cache whose values stay valid for `interval` after each fetch.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn fixed_interval<F>(interval: Duration, fetch: F) -> Self
    where
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        Self::new(CacheConfig::fixed_interval(interval), FromResult(fetch))
    }

    /// Cache whose fetch function supplies each value's expiry.
    ///
    /// ```
    /// use std::time::Duration;
    ///
    /// use memokit::cache::MemoCache;
    /// use memokit::fetch::Fetched;
    ///
    /// let cache = MemoCache::explicit_expiry(|key: &u64| {
    ///     Fetched::<u64, ()>::ok(key * 10).valid_for(Duration::from_secs(5))
    /// });
    /// assert_eq!(cache.get(&4), Ok(40));
    /// ```
    pub fn explicit_expiry<F>(fetch: F) -> Self
    where
        F: Fn(&K) -> Fetched<V, E> + Send + Sync + 'static,
    {
        Self::new(CacheConfig::explicit_expiry(), fetch)
    }

    /// Returns the result for `key`, fetching it if missing or stale.
    #[inline]
    pub fn get(&self, key: &K) -> Result<V, E> {
        self.lookup(key).result
    }

    /// Like [`get`](Self::get) but returns the whole record: the result, the
    /// last good value when the result is an error, and the expiry.
    pub fn lookup(&self, key: &K) -> Lookup<V, E> {
        let now = Instant::now();
        if let Some(entry) = self.map.get(key) {
            if let Some(hit) = entry.fresh(now) {
                trace!("memo cache hit");
                return hit;
            }
        }

        let (entry, created) = self.obtain(key);
        let lookup = self.fulfill(key, &entry, created);
        self.evict(now);
        lookup
    }

    /// Returns the resident record for `key` without fetching, fresh or not.
    pub fn peek(&self, key: &K) -> Option<Lookup<V, E>> {
        self.map.get(key).and_then(|entry| entry.snapshot())
    }

    /// `true` if `key` is resident, fresh or stale.
    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Drops `key` from the map and the eviction list.
    ///
    /// A fetch already running for `key` still lands in the detached entry and
    /// its callers see that result, but the key does not come back until the
    /// next `get`.
    pub fn remove(&self, key: &K) -> bool {
        let mut list = self.list.lock();
        let linked = list.remove(key);
        let mapped = self.map.remove(key).is_some();
        if linked || mapped {
            debug!(resident = list.len(), "memo cache entry removed");
        }
        linked || mapped
    }

    /// Number of resident entries, fresh or stale.
    pub fn len(&self) -> usize {
        self.list.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn mode(&self) -> ExpiryMode {
        self.mode
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries.load(Ordering::Relaxed)
    }

    /// Changes the soft capacity. A lower bound takes effect on the next
    /// eviction pass; zero leaves no entry resident after a slow-path `get`.
    pub fn set_max_entries(&self, max_entries: usize) {
        self.max_entries.store(max_entries, Ordering::Relaxed);
    }

    /// Drops every expired entry, wherever it sits in the list. Entries with a
    /// fetch in flight are kept.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut list = self.list.lock();
        let expired: Vec<K> = list
            .iter()
            .filter(|key| self.reclaimable(key, Some(now)))
            .cloned()
            .collect();

        for key in &expired {
            list.remove(key);
            self.map.remove(key);
        }
        if !expired.is_empty() {
            debug!(purged = expired.len(), resident = list.len(), "expired entries purged");
        }
        expired.len()
    }

    /// Drops every entry.
    pub fn clear(&self) {
        let mut list = self.list.lock();
        list.clear();
        self.map.clear();
    }

    /// Checks list linkage and the list/map bijection.
    ///
    /// # Errors
    ///
    /// Returns [`InvariantError`] describing the first violation found.
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let list = self.list.lock();
        list.validate()?;
        if list.len() != self.map.len() {
            return Err(InvariantError::new(format!(
                "eviction list holds {} keys but map holds {} entries",
                list.len(),
                self.map.len()
            )));
        }
        if list.iter().any(|key| !self.map.contains_key(key)) {
            return Err(InvariantError::new("linked key has no map entry"));
        }
        Ok(())
    }

    /// Returns the entry for `key`, creating and linking it if absent.
    ///
    /// A created entry is born with its flight claimed, so no eviction pass can
    /// reclaim it before its creator fetches; the creator must take the flight
    /// over with [`Entry::resume_flight`].
    fn obtain(&self, key: &K) -> (Arc<Entry<V, E>>, bool) {
        let mut list = self.list.lock();
        match self.map.entry(key.clone()) {
            MapEntry::Occupied(occupied) => (Arc::clone(occupied.get()), false),
            MapEntry::Vacant(vacant) => {
                let entry = Arc::new(Entry::pending());
                vacant.insert(Arc::clone(&entry));
                list.push_front(key.clone());
                (entry, true)
            },
        }
    }

    /// Fetches `key` into `entry`, or waits for the caller already doing so.
    fn fulfill(&self, key: &K, entry: &Entry<V, E>, created: bool) -> Lookup<V, E> {
        let mut claim = if created {
            Some(entry.resume_flight())
        } else {
            entry.begin_or_wait()
        };

        loop {
            match claim {
                Some(flight) => {
                    // a flight may have landed between our miss and the claim
                    if let Some(hit) = entry.fresh(Instant::now()) {
                        return hit;
                    }

                    debug!("memo cache fetch started");
                    let Fetched { result, expire_at } = self.fetcher.fetch(key);
                    let expire_at = self.mode.resolve(expire_at, Instant::now());
                    let succeeded = result.is_ok();
                    let lookup = entry.store(result, expire_at);
                    if succeeded {
                        self.list.lock().touch(key);
                    }
                    debug!(succeeded, "memo cache fetch landed");
                    drop(flight);
                    return lookup;
                },
                None => {
                    if let Some(lookup) = entry.snapshot() {
                        return lookup;
                    }
                    warn!("memo cache fetch unwound without a result, retrying");
                    claim = entry.begin_or_wait();
                },
            }
        }
    }

    /// Trims the list from its oldest end; returns how many entries were
    /// dropped.
    fn evict(&self, now: Instant) -> usize {
        let max_entries = self.max_entries();
        let mut list = self.list.lock();
        let mut evicted = 0usize;

        loop {
            let victim = if list.len() > max_entries {
                list.iter().rev().find(|key| self.reclaimable(key, None)).cloned()
            } else {
                list.oldest()
                    .filter(|key| self.reclaimable(key, Some(now)))
                    .cloned()
            };
            let Some(victim) = victim else {
                break;
            };

            list.remove(&victim);
            self.map.remove(&victim);
            evicted += 1;
        }

        if evicted > 0 {
            debug!(evicted, resident = list.len(), max_entries, "memo cache eviction pass");
        }
        evicted
    }

    /// `true` if `key` may leave the cache: no fetch in flight and, when
    /// `expired_at` is given, expired by then. Keys missing from the map
    /// always may.
    fn reclaimable(&self, key: &K, expired_at: Option<Instant>) -> bool {
        match self.map.get(key) {
            Some(entry) => {
                !entry.is_fetching() && expired_at.is_none_or(|now| entry.is_expired(now))
            },
            None => {
                warn!("eviction list key has no map entry");
                true
            },
        }
    }
}

impl<K, V, E> MemoizedCache<K, V, E> for MemoCache<K, V, E>
where
    K: Clone + Eq + Hash,
    V: Clone,
    E: Clone,
{
    #[inline]
    fn get(&self, key: &K) -> Result<V, E> {
        MemoCache::get(self, key)
    }

    #[inline]
    fn remove(&self, key: &K) -> bool {
        MemoCache::remove(self, key)
    }

    fn len(&self) -> usize {
        MemoCache::len(self)
    }
}

impl<K, V, E> ConcurrentCache for MemoCache<K, V, E>
where
    K: Send + Sync,
    V: Send + Sync,
    E: Send + Sync,
{
}

impl<K, V, E> fmt::Debug for MemoCache<K, V, E>
where
    K: Clone + Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoCache")
            .field("mode", &self.mode)
            .field("max_entries", &self.max_entries.load(Ordering::Relaxed))
            .field("resident", &self.list.lock().len())
            .finish_non_exhaustive()
    }
}
