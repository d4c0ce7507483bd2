//! Core types for the caching system.

use tokio::time::Instant;

/// A stored value and the instant it was stored.
///
/// Entries are never mutated; a refresh replaces the whole entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
  pub data: T,
  pub stored_at: Instant,
}

impl<T> CacheEntry<T> {
  pub fn new(data: T) -> Self {
    Self {
      data,
      stored_at: Instant::now(),
    }
  }
}

/// Result from a cache operation, including where the data came from.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  pub source: CacheSource,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
    }
  }

  /// Create a new cache result from a fresh cache entry.
  pub fn from_cache(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched from the network on this call
  Network,
  /// Served from a cache entry younger than the TTL
  Cache,
}
