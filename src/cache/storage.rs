//! Cache storage trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::traits::CacheEntry;

/// Trait for cache storage backends.
///
/// Storage knows nothing about expiry; freshness is decided by the layer.
pub trait CacheStorage<T>: Send + Sync {
  /// Get the entry stored under `key`, stale or not.
  fn get_entry(&self, key: &str) -> Option<CacheEntry<T>>;

  /// Store an entry, replacing any previous entry for `key`.
  fn store_entry(&self, key: &str, entry: CacheEntry<T>);

  /// Number of stored entries, including stale ones.
  #[cfg(test)]
  fn len(&self) -> usize;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl<T> CacheStorage<T> for NoopStorage {
  fn get_entry(&self, _key: &str) -> Option<CacheEntry<T>> {
    None // Always miss
  }

  fn store_entry(&self, _key: &str, _entry: CacheEntry<T>) {
    // Discard
  }

  #[cfg(test)]
  fn len(&self) -> usize {
    0
  }
}

/// Process-local storage backed by a hash map.
///
/// Unbounded: entries are only ever replaced, never evicted. Stale entries
/// stay until the same key is stored again.
pub struct MemoryStorage<T> {
  entries: Mutex<HashMap<String, CacheEntry<T>>>,
}

impl<T> MemoryStorage<T> {
  pub fn new() -> Self {
    Self {
      entries: Mutex::new(HashMap::new()),
    }
  }

  // Entries are replaced wholesale, so a poisoned map is still consistent.
  fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<T>>> {
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl<T> Default for MemoryStorage<T> {
  fn default() -> Self {
    Self::new()
  }
}

impl<T: Clone + Send> CacheStorage<T> for MemoryStorage<T> {
  fn get_entry(&self, key: &str) -> Option<CacheEntry<T>> {
    self.lock().get(key).cloned()
  }

  fn store_entry(&self, key: &str, entry: CacheEntry<T>) {
    self.lock().insert(key.to_string(), entry);
  }

  #[cfg(test)]
  fn len(&self) -> usize {
    self.lock().len()
  }
}
