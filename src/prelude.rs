pub use crate::builder::MemoCacheBuilder;
pub use crate::cache::MemoCache;
pub use crate::config::{CacheConfig, ExpiryMode};
pub use crate::entry::Lookup;
pub use crate::error::ConfigError;
pub use crate::fetch::{Fetched, FromResult};
pub use crate::traits::{ConcurrentCache, Fetcher, MemoizedCache};
