//! CacheStore - abstract key/value storage for cached payloads.

use super::CacheError;

/// Abstract key/value storage for cached payloads.
///
/// Implementations must tolerate concurrent `get`/`put`/`evict` from many
/// request threads.
pub trait CacheStore<K, V>: Send + Sync {
    /// Get the cached value for a key. Returns None on a miss.
    fn get(&self, key: &K) -> Result<Option<V>, CacheError>;

    /// Insert or replace the value for a key.
    fn put(&self, key: K, value: V) -> Result<(), CacheError>;

    /// Remove the value for a key. Returns true if an entry existed.
    fn evict(&self, key: &K) -> Result<bool, CacheError>;
}

impl<K, V, C: CacheStore<K, V> + ?Sized> CacheStore<K, V> for std::sync::Arc<C> {
    fn get(&self, key: &K) -> Result<Option<V>, CacheError> {
        (**self).get(key)
    }

    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        (**self).put(key, value)
    }

    fn evict(&self, key: &K) -> Result<bool, CacheError> {
        (**self).evict(key)
    }
}
