//! InMemoryCache - HashMap-backed cache for single-process deployments.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, RwLock};

use super::{CacheError, CacheStore};

/// In-memory cache backed by a HashMap.
///
/// Clone-friendly via Arc; clones share the same entries.
#[derive(Clone)]
pub struct InMemoryCache<K, V> {
    entries: Arc<RwLock<HashMap<K, V>>>,
}

impl<K, V> Default for InMemoryCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> InMemoryCache<K, V> {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of cached entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry.
    pub fn clear(&self) -> Result<(), CacheError> {
        self.entries
            .write()
            .map_err(|_| CacheError::Poisoned("lock poisoned".into()))?
            .clear();
        Ok(())
    }
}

impl<K: Eq + Hash, V> InMemoryCache<K, V> {
    /// Check whether a key has an entry.
    pub fn contains(&self, key: &K) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(key))
            .unwrap_or(false)
    }
}

impl<K, V> CacheStore<K, V> for InMemoryCache<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Clone + Send + Sync,
{
    fn get(&self, key: &K) -> Result<Option<V>, CacheError> {
        let entries = self
            .entries
            .read()
            .map_err(|_| CacheError::Poisoned("lock poisoned".into()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&self, key: K, value: V) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::Poisoned("lock poisoned".into()))?;
        entries.insert(key, value);
        Ok(())
    }

    fn evict(&self, key: &K) -> Result<bool, CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::Poisoned("lock poisoned".into()))?;
        Ok(entries.remove(key).is_some())
    }
}
