//! SQLite fetch audit log.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use tracing::warn;

use super::database::connection::DbPool;
use super::database::model::{format_timestamp, parse_timestamp, AuditRow, NewAuditRow};
use super::database::schema::fetch_audit;
use crate::domain::{MetricId, SourceTier};
use crate::error::{Error, Result};
use crate::port::outbound::{AuditSink, FetchAttempt, MetricStatus};

/// Log of retrieval attempts, pruned by age.
pub struct SqliteAuditLog {
    pool: DbPool,
}

impl SqliteAuditLog {
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert one attempt.
    pub fn append(&self, attempt: &FetchAttempt) -> Result<()> {
        let row = NewAuditRow {
            metric: attempt.metric.to_string(),
            tier: attempt.tier.as_str().to_string(),
            success: i32::from(attempt.success),
            latency_ms: i64::try_from(attempt.latency.as_millis()).unwrap_or(i64::MAX),
            error_kind: attempt.error.as_ref().map(|e| e.kind().to_string()),
            error: attempt.error.as_ref().map(ToString::to_string),
            recorded_at: format_timestamp(attempt.at),
        };

        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        diesel::insert_into(fetch_audit::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    /// Delete attempts recorded before `cutoff`. Returns the rows removed.
    pub fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;
        let stale = fetch_audit::table.filter(fetch_audit::recorded_at.lt(format_timestamp(cutoff)));
        diesel::delete(stale)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))
    }

    /// Per-metric status built from attempts recorded at or after `from`.
    pub fn statuses_since(&self, from: DateTime<Utc>) -> Result<Vec<MetricStatus>> {
        let mut conn = self
            .pool
            .get()
            .map_err(|e| Error::Connection(e.to_string()))?;

        let rows: Vec<AuditRow> = fetch_audit::table
            .filter(fetch_audit::recorded_at.ge(format_timestamp(from)))
            .order((fetch_audit::recorded_at.asc(), fetch_audit::id.asc()))
            .select(AuditRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut statuses: HashMap<String, MetricStatus> = HashMap::new();
        for row in rows {
            let tier: SourceTier = row.tier.parse().map_err(Error::Parse)?;
            let at = parse_timestamp(&row.recorded_at)?;
            let success = row.success != 0;
            let (successes, failures) = statuses
                .get(&row.metric)
                .map_or((0, 0), |s| (s.successes, s.failures));
            let status = MetricStatus {
                metric: MetricId::new(row.metric.clone()),
                tier,
                success,
                latency: Duration::from_millis(u64::try_from(row.latency_ms).unwrap_or(0)),
                error: row.error,
                at,
                successes: successes + u64::from(success),
                failures: failures + u64::from(!success),
            };
            statuses.insert(row.metric, status);
        }

        let mut out: Vec<_> = statuses.into_values().collect();
        out.sort_by(|a, b| a.metric.cmp(&b.metric));
        Ok(out)
    }
}

impl AuditSink for SqliteAuditLog {
    fn record(&self, attempt: &FetchAttempt) {
        if let Err(e) = self.append(attempt) {
            warn!(metric = %attempt.metric, error = %e, "Failed to write audit row");
        }
    }
}
