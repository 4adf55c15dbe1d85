//! memokit: single-flight memoizing cache with expiry windows and bounded
//! recency eviction.
//!
//! A [`MemoCache`] wraps a fetch function. Concurrent `get` calls for the same
//! key share one fetch; results, errors included, stay cached until they
//! expire; a recency list bounds how many keys stay resident.
//!
//! ```
//! use std::time::Duration;
//!
//! use memokit::prelude::*;
//!
//! let cache = MemoCacheBuilder::new()
//!     .interval(Duration::from_secs(60))
//!     .max_entries(128)
//!     .build(|path: &String| std::fs::metadata(path).map(|m| m.len()).map_err(|e| e.kind()));
//!
//! assert!(cache.get(&"/definitely/not/here".to_string()).is_err());
//! assert_eq!(cache.len(), 1);
//! ```

pub mod builder;
pub mod cache;
pub mod config;
pub mod ds;
pub mod entry;
pub mod error;
pub mod fetch;
pub mod prelude;
pub mod traits;

pub use crate::builder::MemoCacheBuilder;
pub use crate::cache::MemoCache;
pub use crate::config::{CacheConfig, DEFAULT_MAX_ENTRIES, ExpiryMode};
pub use crate::entry::Lookup;
pub use crate::error::{ConfigError, InvariantError};
pub use crate::fetch::{Fetched, FromResult};
