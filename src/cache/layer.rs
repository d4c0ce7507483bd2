//! Cache layer that orchestrates TTL logic with network fetching.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use super::storage::CacheStorage;
use super::traits::{CacheEntry, CacheResult};

/// Time-to-live for cached responses.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// Cache layer that manages freshness and network fetching.
///
/// Cloning is cheap and clones share the same storage, so one layer built at
/// startup can serve every search session.
pub struct CacheLayer<T> {
  storage: Arc<dyn CacheStorage<T>>,
}

impl<T: Clone + Send + 'static> CacheLayer<T> {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: impl CacheStorage<T> + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
    }
  }

  /// Entries at least [`DEFAULT_TTL`] old are bypassed
  fn is_fresh(&self, stored_at: Instant) -> bool {
    stored_at.elapsed() < DEFAULT_TTL
  }

  /// Get the value for `key` if it was stored less than one TTL ago.
  ///
  /// Stale entries are treated as absent but left in place until a later
  /// `put` overwrites them.
  pub fn get(&self, key: &str) -> Option<T> {
    self
      .storage
      .get_entry(key)
      .filter(|entry| self.is_fresh(entry.stored_at))
      .map(|entry| entry.data)
  }

  /// Store `value` under `key` stamped with the current instant.
  pub fn put(&self, key: &str, value: T) {
    self.storage.store_entry(key, CacheEntry::new(value));
  }

  /// Number of stored entries, stale ones included.
  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.storage.len()
  }

  /// Fetch with a cache-first strategy.
  ///
  /// 1. Check cache - if fresh, return immediately
  /// 2. If stale/missing, fetch from network
  /// 3. Store successful results; failures are returned and never cached
  pub async fn fetch<E, F, Fut>(&self, key: &str, fetcher: F) -> Result<CacheResult<T>, E>
  where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    if let Some(data) = self.get(key) {
      return Ok(CacheResult::from_cache(data));
    }

    let data = fetcher().await?;
    self.put(key, data.clone());
    Ok(CacheResult::from_network(data))
  }
}

impl<T> Clone for CacheLayer<T> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
    }
  }
}
