//! Regime aggregation and the published snapshot.
//!
//! [`aggregate`] is a pure function of its input: it sums the already
//! weighted scores, derives the aggregate confidence from the share of `LOW`
//! metrics, and labels the result with strict cutoffs.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MetricId;
use super::score::{Confidence, ScoredMetric};

/// Version string stamped on every published snapshot.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Directional classification of the market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RegimeLabel {
    Bull,
    Bear,
    Neutral,
}

impl RegimeLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Bull => "BULL",
            Self::Bear => "BEAR",
            Self::Neutral => "NEUTRAL",
        }
    }
}

impl fmt::Display for RegimeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cutoffs used by the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AggregatePolicy {
    /// Totals strictly above this are `BULL`.
    pub bull_cutoff: f64,
    /// Totals strictly below this are `BEAR`.
    pub bear_cutoff: f64,
    /// Aggregate confidence stays `HIGH` while the share of `LOW` metrics is
    /// strictly below this fraction.
    pub low_confidence_cutoff: f64,
}

impl Default for AggregatePolicy {
    fn default() -> Self {
        Self {
            bull_cutoff: 3.0,
            bear_cutoff: -3.0,
            low_confidence_cutoff: 0.3,
        }
    }
}

impl AggregatePolicy {
    /// Combine scored metrics into a regime.
    ///
    /// Only `HIGH` and `MEDIUM` aggregate confidence are produced.
    pub fn aggregate(&self, scored: &[ScoredMetric]) -> Result<Regime, DomainError> {
        if scored.is_empty() {
            return Err(DomainError::EmptyBreakdown);
        }

        let total_score: f64 = scored.iter().map(ScoredMetric::score).sum();
        let low = scored
            .iter()
            .filter(|m| m.confidence() == Confidence::Low)
            .count();
        let low_fraction = low as f64 / scored.len() as f64;

        let confidence = if low_fraction < self.low_confidence_cutoff {
            Confidence::High
        } else {
            Confidence::Medium
        };

        let label = if total_score > self.bull_cutoff {
            RegimeLabel::Bull
        } else if total_score < self.bear_cutoff {
            RegimeLabel::Bear
        } else {
            RegimeLabel::Neutral
        };

        Ok(Regime {
            label,
            total_score,
            confidence,
            low_confidence_fraction: low_fraction,
            breakdown: scored.to_vec(),
        })
    }
}

/// Aggregate with the default policy.
pub fn aggregate(scored: &[ScoredMetric]) -> Result<Regime, DomainError> {
    AggregatePolicy::default().aggregate(scored)
}

/// Result of one aggregation. Never mutated after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Regime {
    label: RegimeLabel,
    total_score: f64,
    confidence: Confidence,
    low_confidence_fraction: f64,
    breakdown: Vec<ScoredMetric>,
}

impl Regime {
    #[must_use]
    pub fn label(&self) -> RegimeLabel {
        self.label
    }

    #[must_use]
    pub fn total_score(&self) -> f64 {
        self.total_score
    }

    #[must_use]
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    #[must_use]
    pub fn low_confidence_fraction(&self) -> f64 {
        self.low_confidence_fraction
    }

    /// Scored metrics in input order.
    #[must_use]
    pub fn breakdown(&self) -> &[ScoredMetric] {
        &self.breakdown
    }
}

/// One row of the published breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BreakdownEntry {
    pub metric_name: MetricId,
    pub score: f64,
    pub raw_value: Option<f64>,
    pub confidence: Confidence,
    pub is_fallback: bool,
}

impl From<&ScoredMetric> for BreakdownEntry {
    fn from(metric: &ScoredMetric) -> Self {
        Self {
            metric_name: metric.metric().clone(),
            score: metric.score(),
            raw_value: metric.raw_value(),
            confidence: metric.confidence(),
            is_fallback: metric.is_fallback(),
        }
    }
}

/// The record handed to downstream consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub engine_version: String,
    pub total_score: f64,
    pub label: RegimeLabel,
    pub confidence: Confidence,
    pub breakdown: Vec<BreakdownEntry>,
}

impl Snapshot {
    #[must_use]
    pub fn new(regime: &Regime, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            engine_version: ENGINE_VERSION.to_string(),
            total_score: regime.total_score(),
            label: regime.label(),
            confidence: regime.confidence(),
            breakdown: regime.breakdown().iter().map(BreakdownEntry::from).collect(),
        }
    }
}

/// Aggregate regime for one UTC day of recorded history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyRegime {
    pub day: NaiveDate,
    pub total_score: f64,
    pub label: RegimeLabel,
    pub confidence: Confidence,
    pub breakdown: Vec<BreakdownEntry>,
}
