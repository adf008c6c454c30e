//! Fetch audit port.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::domain::{MetricId, SourceTier};
use crate::error::FetchError;

/// Record of one retrieval attempt, or of the final degraded result.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchAttempt {
    pub metric: MetricId,
    pub tier: SourceTier,
    pub success: bool,
    pub latency: Duration,
    pub error: Option<FetchError>,
    pub at: DateTime<Utc>,
}

impl FetchAttempt {
    #[must_use]
    pub fn succeeded(metric: &MetricId, tier: SourceTier, latency: Duration) -> Self {
        Self {
            metric: metric.clone(),
            tier,
            success: true,
            latency,
            error: None,
            at: Utc::now(),
        }
    }

    #[must_use]
    pub fn failed(metric: &MetricId, tier: SourceTier, latency: Duration, error: FetchError) -> Self {
        Self {
            metric: metric.clone(),
            tier,
            success: false,
            latency,
            error: Some(error),
            at: Utc::now(),
        }
    }
}

/// Latest known retrieval status of one metric.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricStatus {
    pub metric: MetricId,
    /// Tier of the most recent attempt.
    pub tier: SourceTier,
    pub success: bool,
    pub latency: Duration,
    pub error: Option<String>,
    pub at: DateTime<Utc>,
    /// Successful attempts counted, all tiers.
    pub successes: u64,
    /// Failed attempts counted, all tiers.
    pub failures: u64,
}

/// Destination for fetch audit records.
///
/// Sinks handle their own failures; recording never fails a fetch.
pub trait AuditSink: Send + Sync {
    fn record(&self, attempt: &FetchAttempt);
}
