//! SQLite cache store implementation.

use std::time::Duration;

use chrono::Utc;
use diesel::prelude::*;
use tracing::debug;

use super::database::connection::{checkpoint, DbPool};
use super::database::model::{
    decode_payload, encode_payload, format_timestamp, parse_timestamp, CacheEntryRow,
};
use super::database::schema::cache_entries;
use crate::domain::{CacheKey, MetricData};
use crate::error::{Error, Result};
use crate::port::outbound::CacheStore;

/// SQLite-backed cache of the latest value per metric.
///
/// Entries survive restarts. Upserts run in an immediate transaction so a
/// concurrent reader sees either the old row or the new one.
pub struct SqliteCacheStore {
    pool: DbPool,
}

impl SqliteCacheStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Number of stored entries, fresh or not.
    pub fn len(&self) -> Result<usize> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        let count: i64 = cache_entries::table
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl CacheStore for SqliteCacheStore {
    fn get(&self, key: &CacheKey) -> Result<Option<MetricData>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let row: Option<CacheEntryRow> = cache_entries::table
            .find(key.as_str())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        let Some(row) = row else {
            return Ok(None);
        };

        if parse_timestamp(&row.expires_at)? <= Utc::now() {
            debug!(key = %key, "Cache entry expired");
            diesel::delete(cache_entries::table.find(key.as_str()))
                .execute(&mut conn)
                .map_err(|e| Error::Database(e.to_string()))?;
            return Ok(None);
        }

        decode_payload(&row.payload).map(Some)
    }

    fn set(&self, key: &CacheKey, value: &MetricData, ttl: Duration) -> Result<()> {
        let now = Utc::now();
        let ttl = chrono::Duration::from_std(ttl).map_err(|e| Error::Parse(e.to_string()))?;
        let row = CacheEntryRow {
            key: key.as_str().to_string(),
            metric: value.metric().to_string(),
            payload: encode_payload(value)?,
            stored_at: format_timestamp(now),
            expires_at: format_timestamp(now + ttl),
        };

        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        conn.immediate_transaction(|conn| {
            diesel::replace_into(cache_entries::table)
                .values(&row)
                .execute(conn)
        })
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!(key = %key, tier = %value.tier(), "Cache entry stored");
        Ok(())
    }

    fn remove(&self, key: &CacheKey) -> Result<bool> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        let deleted = diesel::delete(cache_entries::table.find(key.as_str()))
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(deleted > 0)
    }

    fn clear(&self) -> Result<usize> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        diesel::delete(cache_entries::table)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))
    }

    fn flush(&self) -> Result<()> {
        checkpoint(&self.pool)
    }
}
