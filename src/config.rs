//! Construction-time configuration.
//!
//! | Field         | Type         | Default      | Description                          |
//! |---------------|--------------|--------------|--------------------------------------|
//! | `mode`        | `ExpiryMode` | `Explicit`   | How a fetch's validity is computed   |
//! | `max_entries` | `usize`      | 1000         | Soft bound on resident entries       |
//!
//! ## Expiry resolution
//!
//! ```text
//!   fetch returned expiry?  ── yes ──► adopt it verbatim
//!            │
//!            no
//!            │
//!   FixedInterval(d) ──► completed_at + d
//!   Explicit         ──► completed_at       (stale immediately)
//! ```
//!
//! The same rule applies whether the fetch succeeded or failed, so an error is
//! cached for exactly as long as a value would have been.

use std::time::{Duration, Instant};

use crate::error::ConfigError;

/// Default soft capacity of a cache.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Stand-in horizon for expiries past what `Instant` can represent.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// `from + after`, saturating at roughly thirty years out.
pub(crate) fn deadline(from: Instant, after: Duration) -> Instant {
    from.checked_add(after)
        .or_else(|| from.checked_add(FAR_FUTURE))
        .unwrap_or(from)
}

/// How long a fetched value stays valid.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpiryMode {
    /// Values expire a fixed duration after their fetch completes, unless the
    /// fetch supplies its own expiry.
    FixedInterval(Duration),
    /// The fetch supplies the expiry instant per call. A fetch that supplies
    /// none is stale as soon as it completes.
    #[default]
    Explicit,
}

impl ExpiryMode {
    /// Resolves the expiry of a fetch that completed at `completed_at`.
    #[inline]
    pub fn resolve(&self, explicit: Option<Instant>, completed_at: Instant) -> Instant {
        match (explicit, self) {
            (Some(at), _) => at,
            (None, ExpiryMode::FixedInterval(interval)) => deadline(completed_at, *interval),
            (None, ExpiryMode::Explicit) => completed_at,
        }
    }

    /// Configured interval, if any.
    pub fn interval(&self) -> Option<Duration> {
        match self {
            ExpiryMode::FixedInterval(interval) => Some(*interval),
            ExpiryMode::Explicit => None,
        }
    }
}

/// Cache configuration, fixed at construction apart from `max_entries`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub mode: ExpiryMode,
    /// Soft capacity. The eviction pass trims the list back to this size.
    pub max_entries: usize,
}

impl CacheConfig {
    /// Config for [`ExpiryMode::FixedInterval`] with default capacity.
    pub fn fixed_interval(interval: Duration) -> Self {
        Self {
            mode: ExpiryMode::FixedInterval(interval),
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Config for [`ExpiryMode::Explicit`] with default capacity.
    pub fn explicit_expiry() -> Self {
        Self {
            mode: ExpiryMode::Explicit,
            max_entries: DEFAULT_MAX_ENTRIES,
        }
    }

    /// Checks the parameters a cache cannot run with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if `max_entries` is zero or the fixed interval
    /// is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(ConfigError::new("max_entries must be greater than zero"));
        }
        if let ExpiryMode::FixedInterval(interval) = self.mode {
            if interval.is_zero() {
                return Err(ConfigError::new(
                    "fixed refresh interval must be greater than zero",
                ));
            }
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::explicit_expiry()
    }
}
