//! Cache - key/value snapshots that shortcut a bus round trip.
//!
//! The cache holds confirmed-valid resource payloads keyed by resource id.
//! It has no TTL and no capacity bound: entries leave only through explicit
//! `evict` calls made by the bridge ahead of writes and deletes.
//!
//! ## Example
//!
//! ```
//! use comment_bridge::cache::{CacheStore, InMemoryCache};
//!
//! let cache: InMemoryCache<i64, String> = InMemoryCache::new();
//! cache.put(5, "hi".to_string()).unwrap();
//! assert_eq!(cache.get(&5).unwrap(), Some("hi".to_string()));
//!
//! cache.evict(&5).unwrap();
//! assert_eq!(cache.get(&5).unwrap(), None);
//! ```

mod in_memory;
mod store;

use thiserror::Error;

/// Error type for cache operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The lock guarding the entries was poisoned.
    #[error("cache lock poisoned: {0}")]
    Poisoned(String),
}

pub use in_memory::InMemoryCache;
pub use store::CacheStore;
