//! Error types for the memokit library.
//!
//! Fetch failures are not represented here: they are the caller's own error
//! type, cached and returned verbatim.
//!
//! - [`ConfigError`]: construction parameters failed validation (zero
//!   capacity, zero refresh interval).
//! - [`InvariantError`]: [`MemoCache::check_invariants`](crate::cache::MemoCache::check_invariants)
//!   found the eviction list and entry map out of step.
//!
//! ```
//! use std::time::Duration;
//!
//! use memokit::builder::MemoCacheBuilder;
//! use memokit::error::ConfigError;
//!
//! let bad = MemoCacheBuilder::new()
//!     .interval(Duration::ZERO)
//!     .try_build(|key: &u32| Ok::<_, ()>(*key));
//! assert!(matches!(bad, Err(ConfigError { .. })));
//! ```

use std::fmt;

// ---------------------------------------------------------------------------
// InvariantError
// ---------------------------------------------------------------------------

/// Error returned when internal cache invariants are violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// Error returned when cache configuration parameters are invalid.
///
/// Produced by [`MemoCacheBuilder::try_build`](crate::builder::MemoCacheBuilder::try_build)
/// and [`MemoCache::try_new`](crate::cache::MemoCache::try_new).
///
/// ```
/// use memokit::builder::MemoCacheBuilder;
///
/// let err = MemoCacheBuilder::new()
///     .max_entries(0)
///     .try_build(|key: &u32| Ok::<_, ()>(*key))
///     .unwrap_err();
/// assert!(err.to_string().contains("max_entries"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    msg: String,
}

impl ConfigError {
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.msg
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.msg)
    }
}

impl std::error::Error for ConfigError {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invariant_display_shows_message() {
        let err = InvariantError::new("list length 3 differs from map size 2");
        assert_eq!(err.to_string(), "list length 3 differs from map size 2");
        assert_eq!(err.message(), "list length 3 differs from map size 2");
    }

    #[test]
    fn config_display_shows_message() {
        let err = ConfigError::new("max_entries must be greater than zero");
        assert_eq!(err.to_string(), "max_entries must be greater than zero");
        assert!(format!("{:?}", err).contains("max_entries"));
    }

    #[test]
    fn errors_implement_std_error() {
        fn assert_error<T: std::error::Error + Send + Sync + 'static>() {}
        assert_error::<InvariantError>();
        assert_error::<ConfigError>();
    }
}
