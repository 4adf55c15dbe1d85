//! Builder for [`MemoCache`].
//!
//! Collects the expiry mode and capacity, validates them, and pairs them with a
//! fetch function. Without an explicit mode the builder produces an
//! explicit-expiry cache, where each fetch decides its own validity.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//!
//! use memokit::builder::MemoCacheBuilder;
//!
//! let cache = MemoCacheBuilder::new()
//!     .interval(Duration::from_secs(10))
//!     .max_entries(64)
//!     .build(|id: &u64| Ok::<_, String>(format!("user-{id}")));
//!
//! assert_eq!(cache.get(&7), Ok("user-7".to_string()));
//! assert_eq!(cache.max_entries(), 64);
//! ```

use std::hash::Hash;
use std::time::Duration;

use crate::cache::MemoCache;
use crate::config::{CacheConfig, ExpiryMode};
use crate::error::ConfigError;
use crate::fetch::FromResult;
use crate::traits::Fetcher;

/// Configures and builds a [`MemoCache`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoCacheBuilder {
    config: CacheConfig,
}

impl MemoCacheBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values stay valid for `interval` after their fetch completes.
    pub fn interval(mut self, interval: Duration) -> Self {
        self.config.mode = ExpiryMode::FixedInterval(interval);
        self
    }

    /// Each fetch supplies its own expiry.
    pub fn explicit_expiry(mut self) -> Self {
        self.config.mode = ExpiryMode::Explicit;
        self
    }

    pub fn mode(mut self, mode: ExpiryMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Soft bound on resident entries.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = max_entries;
        self
    }

    /// The configuration collected so far.
    pub fn config(&self) -> CacheConfig {
        self.config
    }

    /// Builds a cache around a `Result`-returning fetch function.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid. See [`try_build`](Self::try_build).
    pub fn build<K, V, E, F>(self, fetch: F) -> MemoCache<K, V, E>
    where
        K: Clone + Eq + Hash,
        V: Clone,
        E: Clone,
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        self.build_with(FromResult(fetch))
    }

    /// Fallible form of [`build`](Self::build).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_entries` is zero or the interval is zero.
    pub fn try_build<K, V, E, F>(self, fetch: F) -> Result<MemoCache<K, V, E>, ConfigError>
    where
        K: Clone + Eq + Hash,
        V: Clone,
        E: Clone,
        F: Fn(&K) -> Result<V, E> + Send + Sync + 'static,
    {
        self.try_build_with(FromResult(fetch))
    }

    /// Builds a cache around any [`Fetcher`], including closures returning
    /// [`Fetched`](crate::fetch::Fetched) with their own expiry.
    ///
    /// # Panics
    ///
    /// Panics if the configuration is invalid.
    pub fn build_with<K, V, E>(self, fetcher: impl Fetcher<K, V, E> + 'static) -> MemoCache<K, V, E>
    where
        K: Clone + Eq + Hash,
        V: Clone,
        E: Clone,
    {
        MemoCache::new(self.config, fetcher)
    }

    /// Fallible form of [`build_with`](Self::build_with).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_entries` is zero or the interval is zero.
    pub fn try_build_with<K, V, E>(
        self,
        fetcher: impl Fetcher<K, V, E> + 'static,
    ) -> Result<MemoCache<K, V, E>, ConfigError>
    where
        K: Clone + Eq + Hash,
        V: Clone,
        E: Clone,
    {
        MemoCache::try_new(self.config, fetcher)
    }
}
