//! Generic response cache with time-based invalidation.
//!
//! This module provides a source-agnostic caching mechanism that:
//! - Maps a string key to one value and the instant it was stored
//! - Treats entries older than the TTL as absent
//! - Overwrites entries wholesale on every store
//! - Keeps everything in memory; nothing survives a restart

mod layer;
mod storage;
mod traits;

pub use layer::CacheLayer;
pub use storage::{MemoryStorage, NoopStorage};
pub use traits::{CacheResult, CacheSource};
