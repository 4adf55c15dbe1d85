//! Fetch outcomes and adapters for user fetch functions.
//!
//! Every fetch produces a [`Fetched`]: the `Result` of the lookup plus an
//! optional explicit expiry. Plain `Result`-returning closures are wrapped in
//! [`FromResult`], which never supplies an expiry and so defers to the cache's
//! [`ExpiryMode`](crate::config::ExpiryMode).

use std::fmt;
use std::time::{Duration, Instant};

use crate::config::deadline;
use crate::traits::Fetcher;

/// Outcome of one call to the fetch function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fetched<V, E> {
    pub result: Result<V, E>,
    /// Overrides the configured interval when set.
    pub expire_at: Option<Instant>,
}

impl<V, E> Fetched<V, E> {
    pub fn ok(value: V) -> Self {
        Self {
            result: Ok(value),
            expire_at: None,
        }
    }

    pub fn err(error: E) -> Self {
        Self {
            result: Err(error),
            expire_at: None,
        }
    }

    /// Sets the instant after which the outcome is stale.
    pub fn expires_at(mut self, at: Instant) -> Self {
        self.expire_at = Some(at);
        self
    }

    /// Marks the outcome valid for `ttl` from now. Durations too large for
    /// `Instant` saturate far in the future.
    pub fn valid_for(self, ttl: Duration) -> Self {
        self.expires_at(deadline(Instant::now(), ttl))
    }
}

impl<V, E> From<Result<V, E>> for Fetched<V, E> {
    fn from(result: Result<V, E>) -> Self {
        Self {
            result,
            expire_at: None,
        }
    }
}

/// Adapts a `Fn(&K) -> Result<V, E>` into a [`Fetcher`].
#[derive(Clone)]
pub struct FromResult<F>(pub F);

impl<F> fmt::Debug for FromResult<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FromResult(..)")
    }
}

impl<K, V, E, F> Fetcher<K, V, E> for FromResult<F>
where
    F: Fn(&K) -> Result<V, E> + Send + Sync,
{
    #[inline]
    fn fetch(&self, key: &K) -> Fetched<V, E> {
        (self.0)(key).into()
    }
}
