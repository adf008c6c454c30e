//! Daily regime replay over the history row store.
//!
//! Rows are grouped by UTC day and the last observation of each metric in a
//! day stands for that day. Multiplier strategies see the preceding daily
//! values as their trailing window.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::debug;

use crate::domain::{
    score_metric, trailing_days, AggregatePolicy, BreakdownEntry, DailyRegime, MetricData,
    MetricId, MetricSpec,
};
use crate::error::Result;
use crate::port::outbound::HistoryStore;

pub struct HistoryReplay {
    history: Arc<dyn HistoryStore>,
    specs: Vec<MetricSpec>,
    policy: AggregatePolicy,
}

impl HistoryReplay {
    #[must_use]
    pub fn new(
        history: Arc<dyn HistoryStore>,
        specs: Vec<MetricSpec>,
        policy: AggregatePolicy,
    ) -> Self {
        Self {
            history,
            specs,
            policy,
        }
    }

    /// Regimes for the last `days` days, oldest first.
    pub fn last_days(&self, days: u32) -> Result<Vec<DailyRegime>> {
        self.replay(trailing_days(Utc::now(), days))
    }

    /// Regimes for every day with data at or after `from`, oldest first.
    ///
    /// Days on which no configured metric has a value are omitted.
    pub fn replay(&self, from: DateTime<Utc>) -> Result<Vec<DailyRegime>> {
        let rows = self.history.since(from)?;
        debug!(rows = rows.len(), from = %from, "Replaying history");

        let mut days: BTreeMap<NaiveDate, HashMap<MetricId, MetricData>> = BTreeMap::new();
        for row in rows {
            let day = row.bucket.date_naive();
            let per_metric = days.entry(day).or_default();
            let newer = per_metric
                .get(row.data.metric())
                .map_or(true, |seen| seen.timestamp() <= row.data.timestamp());
            if newer {
                per_metric.insert(row.data.metric().clone(), row.data);
            }
        }

        let mut trailing: HashMap<MetricId, Vec<f64>> = HashMap::new();
        let mut out = Vec::with_capacity(days.len());
        for (day, observed) in days {
            let mut scored = Vec::new();
            for spec in &self.specs {
                let Some(data) = observed.get(&spec.id) else {
                    continue;
                };
                let prior = trailing.entry(spec.id.clone()).or_default();
                scored.push(score_metric(spec, data, prior));
                if let Some(value) = data.value() {
                    prior.push(value);
                    let keep = spec.scorer.lookback();
                    if prior.len() > keep {
                        prior.drain(..prior.len() - keep);
                    }
                }
            }
            if scored.is_empty() {
                continue;
            }

            let regime = self.policy.aggregate(&scored)?;
            out.push(DailyRegime {
                day,
                total_score: regime.total_score(),
                label: regime.label(),
                confidence: regime.confidence(),
                breakdown: regime.breakdown().iter().map(BreakdownEntry::from).collect(),
            });
        }
        Ok(out)
    }
}
