//! Historical row store port.
//!
//! Rows are keyed by metric identity plus a time bucket
//! (`<metric>/<bucket start>`), so a prefix scan over `<metric>/` returns the
//! metric's history in chronological order.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{MetricData, MetricId};
use crate::error::Result;

/// Fixed-width time buckets used for history keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryBucket {
    width_secs: i64,
}

impl HistoryBucket {
    /// Buckets of `width_secs` seconds (clamped to at least one second).
    #[must_use]
    pub fn new(width_secs: u64) -> Self {
        Self {
            width_secs: i64::try_from(width_secs).unwrap_or(i64::MAX).max(1),
        }
    }

    /// Start of the bucket containing `at`.
    #[must_use]
    pub fn start_of(&self, at: DateTime<Utc>) -> DateTime<Utc> {
        let secs = at.timestamp();
        let start = secs - secs.rem_euclid(self.width_secs);
        Utc.timestamp_opt(start, 0).single().unwrap_or(at)
    }

    /// Row key for `metric` in the bucket containing `at`.
    #[must_use]
    pub fn key(&self, metric: &MetricId, at: DateTime<Utc>) -> String {
        format_key(metric, self.start_of(at))
    }
}

impl Default for HistoryBucket {
    fn default() -> Self {
        Self::new(3600)
    }
}

/// Row key for `metric` at an exact bucket start.
#[must_use]
pub fn format_key(metric: &MetricId, bucket: DateTime<Utc>) -> String {
    format!("{metric}/{}", bucket.format("%Y-%m-%dT%H:%M:%SZ"))
}

/// One stored observation.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRow {
    pub key: String,
    pub bucket: DateTime<Utc>,
    pub data: MetricData,
    pub recorded_at: DateTime<Utc>,
}

/// Append-mostly store of metric observations, one row per metric per bucket.
pub trait HistoryStore: Send + Sync {
    /// Upsert the row for `data`'s metric in `bucket`.
    fn record(&self, data: &MetricData, bucket: DateTime<Utc>) -> Result<()>;

    /// Up to `limit` values for `metric` from buckets strictly before
    /// `before`, oldest first.
    fn recent_before(
        &self,
        metric: &MetricId,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<f64>>;

    /// All rows whose key starts with `prefix`, ordered by key.
    fn scan_prefix(&self, prefix: &str) -> Result<Vec<HistoryRow>>;

    /// All rows with a bucket at or after `from`, ordered by bucket.
    fn since(&self, from: DateTime<Utc>) -> Result<Vec<HistoryRow>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_truncates_to_width() {
        let bucket = HistoryBucket::new(3600);
        let at = Utc.with_ymd_and_hms(2026, 10, 18, 13, 47, 12).unwrap();
        assert_eq!(
            bucket.start_of(at),
            Utc.with_ymd_and_hms(2026, 10, 18, 13, 0, 0).unwrap()
        );
    }

    #[test]
    fn keys_sort_chronologically() {
        let bucket = HistoryBucket::new(60);
        let metric = MetricId::new("hash_rate");
        let early = bucket.key(&metric, Utc.with_ymd_and_hms(2026, 1, 2, 9, 5, 0).unwrap());
        let late = bucket.key(&metric, Utc.with_ymd_and_hms(2026, 1, 2, 10, 0, 0).unwrap());
        assert_eq!(early, "hash_rate/2026-01-02T09:05:00Z");
        assert!(early < late);
    }

    #[test]
    fn zero_width_is_clamped() {
        let bucket = HistoryBucket::new(0);
        let at = Utc.with_ymd_and_hms(2026, 1, 2, 9, 5, 7).unwrap();
        assert_eq!(bucket.start_of(at), at);
    }
}
