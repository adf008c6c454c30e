//! One aggregation cycle: concurrent fan-out over every configured metric,
//! a deadline-bounded fan-in barrier, then scoring and aggregation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::task::JoinSet;
use tokio::time::{timeout_at, Instant};
use tracing::{debug, info, warn};

use crate::application::fetch::FetchOrchestrator;
use crate::domain::{score_metric, AggregatePolicy, MetricData, MetricSpec, ScoredMetric, Snapshot};
use crate::error::{Error, Result};
use crate::port::outbound::MetricSource;

/// A metric together with the adapter that retrieves it.
#[derive(Clone)]
pub struct MetricBinding {
    pub spec: MetricSpec,
    pub source: Arc<dyn MetricSource>,
}

impl MetricBinding {
    #[must_use]
    pub fn new(spec: MetricSpec, source: Arc<dyn MetricSource>) -> Self {
        Self { spec, source }
    }
}

/// Runs aggregation cycles over a fixed, ordered set of metrics.
pub struct RegimeEngine {
    orchestrator: Arc<FetchOrchestrator>,
    metrics: Vec<MetricBinding>,
    policy: AggregatePolicy,
    deadline: Duration,
}

impl RegimeEngine {
    #[must_use]
    pub fn new(
        orchestrator: Arc<FetchOrchestrator>,
        metrics: Vec<MetricBinding>,
        policy: AggregatePolicy,
        deadline: Duration,
    ) -> Self {
        Self {
            orchestrator,
            metrics,
            policy,
            deadline,
        }
    }

    #[must_use]
    pub fn orchestrator(&self) -> &Arc<FetchOrchestrator> {
        &self.orchestrator
    }

    #[must_use]
    pub fn metrics(&self) -> &[MetricBinding] {
        &self.metrics
    }

    /// Fetch, score and aggregate every metric once.
    ///
    /// Metrics still outstanding at the deadline are cancelled and scored
    /// as failed. The breakdown keeps configuration order.
    pub async fn run_cycle(&self) -> Result<Snapshot> {
        if self.metrics.is_empty() {
            return Err(Error::NoMetricsConfigured);
        }
        info!(metrics = self.metrics.len(), "Cycle started");

        let results = self.collect().await?;

        let scored: Vec<ScoredMetric> = self
            .metrics
            .iter()
            .zip(results.iter())
            .map(|(binding, data)| self.score(&binding.spec, data))
            .collect();

        let regime = self.policy.aggregate(&scored)?;
        let snapshot = Snapshot::new(&regime, Utc::now());
        info!(
            label = %snapshot.label,
            total_score = snapshot.total_score,
            confidence = %snapshot.confidence,
            "Cycle finished"
        );
        Ok(snapshot)
    }

    /// Fan out one task per metric and wait for all of them, or the deadline.
    async fn collect(&self) -> Result<Vec<MetricData>> {
        let deadline = Instant::now() + self.deadline;
        let mut tasks = JoinSet::new();
        for (index, binding) in self.metrics.iter().enumerate() {
            let orchestrator = Arc::clone(&self.orchestrator);
            let binding = binding.clone();
            tasks.spawn(async move {
                let data = orchestrator
                    .fetch(&binding.spec, binding.source.as_ref())
                    .await;
                (index, data)
            });
        }

        let mut results: Vec<Option<MetricData>> = vec![None; self.metrics.len()];
        let mut reported = 0usize;
        loop {
            match timeout_at(deadline, tasks.join_next()).await {
                Ok(Some(Ok((index, data)))) => {
                    results[index] = Some(data);
                    reported += 1;
                }
                Ok(Some(Err(e))) => warn!(error = %e, "Metric task did not complete"),
                Ok(None) => break,
                Err(_) => {
                    let pending = tasks.len();
                    warn!(
                        pending,
                        deadline_secs = self.deadline.as_secs(),
                        "Cycle deadline reached, cancelling outstanding fetches"
                    );
                    tasks.abort_all();
                    if reported == 0 {
                        return Err(Error::CycleDeadline { pending });
                    }
                    break;
                }
            }
        }

        let now = Utc::now();
        Ok(self
            .metrics
            .iter()
            .zip(results)
            .map(|(binding, data)| {
                data.unwrap_or_else(|| {
                    debug!(metric = %binding.spec.id, "Substituting failed result");
                    MetricData::failed(binding.spec.id.clone(), now)
                })
            })
            .collect())
    }

    fn score(&self, spec: &MetricSpec, data: &MetricData) -> ScoredMetric {
        let lookback = spec.scorer.lookback();
        if lookback == 0 || data.value().is_none() {
            return score_metric(spec, data, &[]);
        }

        let bucket = self.orchestrator.bucket().start_of(data.timestamp());
        let trailing = match self
            .orchestrator
            .context()
            .history
            .recent_before(&spec.id, bucket, lookback)
        {
            Ok(values) => values,
            Err(e) => {
                warn!(metric = %spec.id, error = %e, "History read failed, scoring without trend");
                Vec::new()
            }
        };
        score_metric(spec, data, &trailing)
    }
}
