//! Scored metrics and confidence tiers.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::MetricId;
use super::metric::{MetricData, SourceTier};

/// Qualitative reliability of a metric or of the aggregate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    /// Confidence implied by the tier that produced a value.
    #[must_use]
    pub const fn for_tier(tier: SourceTier) -> Self {
        match tier {
            SourceTier::Primary => Self::High,
            SourceTier::Backup => Self::Medium,
            SourceTier::Failed => Self::Low,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metric converted into a weighted directional score.
///
/// Built only through [`ScoredMetric::from_data`] and
/// [`ScoredMetric::neutral`], which keep `score` inside `[-weight, weight]`
/// and never pair a fallback value with `HIGH` confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredMetric {
    metric_name: MetricId,
    score: f64,
    raw_value: Option<f64>,
    confidence: Confidence,
    is_fallback: bool,
    timestamp: DateTime<Utc>,
}

impl ScoredMetric {
    /// Score `data` with the directional `factor` (-1, 0 or +1) and `weight`.
    #[must_use]
    pub(crate) fn from_data(data: &MetricData, factor: f64, weight: f64) -> Self {
        let factor = factor.clamp(-1.0, 1.0);
        Self {
            metric_name: data.metric().clone(),
            score: factor * weight,
            raw_value: data.value(),
            confidence: Confidence::for_tier(data.tier()),
            is_fallback: data.is_fallback(),
            timestamp: data.timestamp(),
        }
    }

    /// A zero score with `LOW` confidence for missing or unusable input.
    #[must_use]
    pub(crate) fn neutral(data: &MetricData) -> Self {
        Self {
            metric_name: data.metric().clone(),
            score: 0.0,
            raw_value: data.value().filter(|v| v.is_finite()),
            confidence: Confidence::Low,
            is_fallback: data.is_fallback(),
            timestamp: data.timestamp(),
        }
    }

    #[must_use]
    pub fn metric(&self) -> &MetricId {
        &self.metric_name
    }

    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    #[must_use]
    pub fn raw_value(&self) -> Option<f64> {
        self.raw_value
    }

    #[must_use]
    pub fn confidence(&self) -> Confidence {
        self.confidence
    }

    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.is_fallback
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_follows_tier() {
        assert_eq!(Confidence::for_tier(SourceTier::Primary), Confidence::High);
        assert_eq!(Confidence::for_tier(SourceTier::Backup), Confidence::Medium);
        assert_eq!(Confidence::for_tier(SourceTier::Failed), Confidence::Low);
    }

    #[test]
    fn backup_values_never_score_high() {
        let data = MetricData::backup(MetricId::new("hash_rate"), 1.2, Utc::now());
        let scored = ScoredMetric::from_data(&data, 1.0, 2.0);
        assert!(scored.is_fallback());
        assert_ne!(scored.confidence(), Confidence::High);
        assert_eq!(scored.score(), 2.0);
    }

    #[test]
    fn factor_is_clamped_to_weight() {
        let data = MetricData::primary(MetricId::new("rsi"), 10.0, Utc::now());
        let scored = ScoredMetric::from_data(&data, 7.0, 1.5);
        assert_eq!(scored.score(), 1.5);
    }

    #[test]
    fn neutral_drops_non_finite_raw_values() {
        let data = MetricData::primary(MetricId::new("rsi"), f64::NAN, Utc::now());
        let scored = ScoredMetric::neutral(&data);
        assert_eq!(scored.score(), 0.0);
        assert_eq!(scored.raw_value(), None);
        assert_eq!(scored.confidence(), Confidence::Low);
    }

    #[test]
    fn confidence_serializes_uppercase() {
        let json = serde_json::to_string(&Confidence::Medium).unwrap();
        assert_eq!(json, "\"MEDIUM\"");
    }
}
