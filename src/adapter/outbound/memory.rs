//! In-memory cache and history stores.
//!
//! For embedders that do not need persistence, and for the tests. Nothing
//! here survives a restart.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::time::Instant;
use tracing::debug;

use crate::domain::{CacheKey, MetricData, MetricId};
use crate::error::Result;
use crate::port::outbound::history::format_key;
use crate::port::outbound::{CacheStore, HistoryRow, HistoryStore};

#[derive(Debug, Clone)]
struct CachedEntry {
    data: MetricData,
    expires_at: Instant,
}

/// TTL cache held in a map behind a read-write lock.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<HashMap<CacheKey, CachedEntry>>,
}

impl MemoryCacheStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl CacheStore for MemoryCacheStore {
    fn get(&self, key: &CacheKey) -> Result<Option<MetricData>> {
        let now = Instant::now();
        {
            let entries = self.entries.read();
            match entries.get(key) {
                None => return Ok(None),
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.data.clone())),
                Some(_) => {}
            }
        }
        debug!(key = %key, "Cache entry expired");
        let mut entries = self.entries.write();
        if entries.get(key).is_some_and(|e| e.expires_at <= now) {
            entries.remove(key);
        }
        Ok(None)
    }

    fn set(&self, key: &CacheKey, value: &MetricData, ttl: Duration) -> Result<()> {
        self.entries.write().insert(
            key.clone(),
            CachedEntry {
                data: value.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<bool> {
        Ok(self.entries.write().remove(key).is_some())
    }

    fn clear(&self) -> Result<usize> {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        Ok(removed)
    }
}

/// History rows in a key-ordered map, mirroring the SQLite layout.
#[derive(Debug, Default)]
pub struct MemoryHistoryStore {
    rows: RwLock<BTreeMap<String, HistoryRow>>,
}

impl MemoryHistoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl HistoryStore for MemoryHistoryStore {
    fn record(&self, data: &MetricData, bucket: DateTime<Utc>) -> Result<()> {
        let key = format_key(data.metric(), bucket);
        self.rows.write().insert(
            key.clone(),
            HistoryRow {
                key,
                bucket,
                data: data.clone(),
                recorded_at: Utc::now(),
            },
        );
        Ok(())
    }

    fn recent_before(
        &self,
        metric: &MetricId,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<f64>> {
        let rows = self.rows.read();
        let prefix = format!("{metric}/");
        let mut values: Vec<f64> = rows
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(_, row)| row.bucket < before)
            .filter_map(|(_, row)| row.data.value())
            .collect();
        let skip = values.len().saturating_sub(limit);
        values.drain(..skip);
        Ok(values)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<HistoryRow>> {
        let rows = self.rows.read();
        Ok(rows
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(_, row)| row.clone())
            .collect())
    }

    fn since(&self, from: DateTime<Utc>) -> Result<Vec<HistoryRow>> {
        let mut out: Vec<HistoryRow> = self
            .rows
            .read()
            .values()
            .filter(|row| row.bucket >= from)
            .cloned()
            .collect();
        out.sort_by(|a, b| a.bucket.cmp(&b.bucket).then_with(|| a.key.cmp(&b.key)));
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn data(metric: &str, value: f64) -> MetricData {
        MetricData::primary(MetricId::new(metric), value, Utc::now())
    }

    #[tokio::test(start_paused = true)]
    async fn cache_entry_expires_after_ttl() {
        let cache = MemoryCacheStore::new();
        let key = CacheKey::latest(&MetricId::new("rsi"));
        cache.set(&key, &data("rsi", 40.0), Duration::from_secs(300)).unwrap();

        tokio::time::advance(Duration::from_secs(299)).await;
        assert!(cache.get(&key).unwrap().is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&key).unwrap().is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn history_prefix_scan_stays_within_metric() {
        let store = MemoryHistoryStore::new();
        let at = Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap();
        store.record(&data("rsi", 1.0), at).unwrap();
        store.record(&data("rsi_fast", 2.0), at).unwrap();

        assert_eq!(store.scan_prefix("rsi/").unwrap().len(), 1);
    }

    #[test]
    fn recent_before_keeps_the_newest() {
        let store = MemoryHistoryStore::new();
        for h in 0..5 {
            let at = Utc.with_ymd_and_hms(2026, 10, 1, h, 0, 0).unwrap();
            store.record(&data("hash_rate", f64::from(h)), at).unwrap();
        }
        let before = Utc.with_ymd_and_hms(2026, 10, 1, 4, 0, 0).unwrap();
        let values = store
            .recent_before(&MetricId::new("hash_rate"), before, 2)
            .unwrap();
        assert_eq!(values, [2.0, 3.0]);
    }
}
