//! Database model types for Diesel ORM.

use chrono::{DateTime, SecondsFormat, Utc};
use diesel::prelude::*;

use super::schema::{cache_entries, fetch_audit, metric_history};
use crate::domain::MetricData;
use crate::error::{Error, Result};

/// Database row for a cache entry.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = cache_entries)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CacheEntryRow {
    pub key: String,
    pub metric: String,
    pub payload: String,
    pub stored_at: String,
    pub expires_at: String,
}

/// Database row for a history observation.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = metric_history)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct HistoryEntryRow {
    pub key: String,
    pub metric: String,
    pub bucket: String,
    pub payload: String,
    pub recorded_at: String,
}

/// Database row for an audit record (insertable).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = fetch_audit)]
pub struct NewAuditRow {
    pub metric: String,
    pub tier: String,
    pub success: i32,
    pub latency_ms: i64,
    pub error_kind: Option<String>,
    pub error: Option<String>,
    pub recorded_at: String,
}

/// Database row for an audit record (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = fetch_audit)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct AuditRow {
    pub id: Option<i32>,
    pub metric: String,
    pub tier: String,
    pub success: i32,
    pub latency_ms: i64,
    pub error_kind: Option<String>,
    pub error: Option<String>,
    pub recorded_at: String,
}

/// Fixed-width RFC 3339 form, so stored timestamps compare as text.
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| Error::Parse(e.to_string()))
}

pub fn encode_payload(data: &MetricData) -> Result<String> {
    serde_json::to_string(data).map_err(|e| Error::Parse(e.to_string()))
}

pub fn decode_payload(raw: &str) -> Result<MetricData> {
    serde_json::from_str(raw).map_err(|e| Error::Parse(e.to_string()))
}
