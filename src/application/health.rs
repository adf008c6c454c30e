//! In-memory fetch health tracking.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::domain::MetricId;
use crate::port::outbound::{AuditSink, FetchAttempt, MetricStatus};

/// Audit sink that keeps the latest attempt per metric in memory.
#[derive(Debug, Default)]
pub struct HealthTracker {
    statuses: RwLock<HashMap<MetricId, MetricStatus>>,
}

impl HealthTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn latest(&self, metric: &MetricId) -> Option<MetricStatus> {
        self.statuses.read().get(metric).cloned()
    }

    /// Every tracked metric, ordered by id.
    #[must_use]
    pub fn statuses(&self) -> Vec<MetricStatus> {
        let mut all: Vec<_> = self.statuses.read().values().cloned().collect();
        all.sort_by(|a, b| a.metric.cmp(&b.metric));
        all
    }

    /// Total attempts recorded since startup.
    #[must_use]
    pub fn attempts(&self) -> u64 {
        self.statuses
            .read()
            .values()
            .map(|s| s.successes + s.failures)
            .sum()
    }
}

impl AuditSink for HealthTracker {
    fn record(&self, attempt: &FetchAttempt) {
        let mut statuses = self.statuses.write();
        let (successes, failures) = statuses
            .get(&attempt.metric)
            .map_or((0, 0), |s| (s.successes, s.failures));
        let (successes, failures) = if attempt.success {
            (successes + 1, failures)
        } else {
            (successes, failures + 1)
        };
        statuses.insert(
            attempt.metric.clone(),
            MetricStatus {
                metric: attempt.metric.clone(),
                tier: attempt.tier,
                success: attempt.success,
                latency: attempt.latency,
                error: attempt.error.as_ref().map(ToString::to_string),
                at: attempt.at,
                successes,
                failures,
            },
        );
    }
}

/// Forwards every record to each wrapped sink in order.
#[derive(Default)]
pub struct FanoutAudit {
    sinks: Vec<Arc<dyn AuditSink>>,
}

impl FanoutAudit {
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn AuditSink>>) -> Self {
        Self { sinks }
    }

    #[must_use]
    pub fn with(mut self, sink: Arc<dyn AuditSink>) -> Self {
        self.sinks.push(sink);
        self
    }
}

impl AuditSink for FanoutAudit {
    fn record(&self, attempt: &FetchAttempt) {
        for sink in &self.sinks {
            sink.record(attempt);
        }
    }
}
