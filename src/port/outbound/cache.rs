//! Metric cache port.

use std::time::Duration;

use crate::domain::{CacheKey, MetricData};
use crate::error::Result;

/// Durable, TTL-bounded store for the latest value of each metric.
///
/// Implementations must make `set` an atomic upsert so that a concurrent
/// `get` never observes a partially written entry. Expired entries are
/// treated as absent and removed when read.
pub trait CacheStore: Send + Sync {
    /// Fetch a fresh entry, evicting it if it has expired.
    fn get(&self, key: &CacheKey) -> Result<Option<MetricData>>;

    /// Insert or replace an entry that stays fresh for `ttl`.
    fn set(&self, key: &CacheKey, value: &MetricData, ttl: Duration) -> Result<()>;

    /// Remove an entry. Returns whether one existed.
    fn remove(&self, key: &CacheKey) -> Result<bool>;

    /// Remove every entry. Returns the number removed.
    fn clear(&self) -> Result<usize>;

    /// Make all written entries durable. Called on shutdown.
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}
