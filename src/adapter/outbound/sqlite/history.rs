//! SQLite history row store implementation.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::database::connection::DbPool;
use super::database::model::{
    decode_payload, encode_payload, format_timestamp, parse_timestamp, HistoryEntryRow,
};
use super::database::schema::metric_history;
use crate::domain::{MetricData, MetricId};
use crate::error::{Error, Result};
use crate::port::outbound::history::{format_key, HistoryRow, HistoryStore};

/// SQLite-backed history rows keyed `<metric>/<bucket start>`.
pub struct SqliteHistoryStore {
    pool: DbPool,
}

impl SqliteHistoryStore {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn from_row(row: HistoryEntryRow) -> Result<HistoryRow> {
        Ok(HistoryRow {
            bucket: parse_timestamp(&row.bucket)?,
            data: decode_payload(&row.payload)?,
            recorded_at: parse_timestamp(&row.recorded_at)?,
            key: row.key,
        })
    }
}

fn bucket_text(bucket: DateTime<Utc>) -> String {
    bucket.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Escape LIKE wildcards so a prefix matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for c in prefix.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

impl HistoryStore for SqliteHistoryStore {
    fn record(&self, data: &MetricData, bucket: DateTime<Utc>) -> Result<()> {
        let row = HistoryEntryRow {
            key: format_key(data.metric(), bucket),
            metric: data.metric().to_string(),
            bucket: bucket_text(bucket),
            payload: encode_payload(data)?,
            recorded_at: format_timestamp(Utc::now()),
        };

        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        conn.immediate_transaction(|conn| {
            diesel::replace_into(metric_history::table)
                .values(&row)
                .execute(conn)
        })
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    fn recent_before(
        &self,
        metric: &MetricId,
        before: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<f64>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let rows: Vec<HistoryEntryRow> = metric_history::table
            .filter(metric_history::metric.eq(metric.as_str()))
            .filter(metric_history::bucket.lt(bucket_text(before)))
            .order(metric_history::bucket.desc())
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut values = Vec::with_capacity(rows.len());
        for row in rows.iter().rev() {
            if let Some(value) = decode_payload(&row.payload)?.value() {
                values.push(value);
            }
        }
        Ok(values)
    }

    fn scan_prefix(&self, prefix: &str) -> Result<Vec<HistoryRow>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let rows: Vec<HistoryEntryRow> = metric_history::table
            .filter(metric_history::key.like(like_prefix(prefix)).escape('\\'))
            .order(metric_history::key.asc())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }

    fn since(&self, from: DateTime<Utc>) -> Result<Vec<HistoryRow>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let rows: Vec<HistoryEntryRow> = metric_history::table
            .filter(metric_history::bucket.ge(bucket_text(from)))
            .order((metric_history::bucket.asc(), metric_history::key.asc()))
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(Self::from_row).collect()
    }
}
