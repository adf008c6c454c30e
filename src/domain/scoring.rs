//! Per-metric scoring strategies.
//!
//! Every metric is bound to exactly one [`Scorer`]. The set of strategies is
//! closed, so dispatch is a single `match` rather than a trait object.
//!
//! All cutoffs are strict: a value sitting exactly on a bull or bear
//! threshold scores zero.
//!
//! # Examples
//!
//! ```
//! use chrono::Utc;
//! use regimewatch::domain::{score_metric, Confidence, MetricData, MetricId, MetricSpec, Scorer};
//!
//! let spec = MetricSpec::new(
//!     MetricId::new("fear_greed_index"),
//!     1.0,
//!     Scorer::threshold(70.0, 30.0, false),
//! );
//! let data = MetricData::primary(MetricId::new("fear_greed_index"), 23.0, Utc::now());
//!
//! let scored = score_metric(&spec, &data, &[]);
//! assert_eq!(scored.score(), -1.0);
//! assert_eq!(scored.confidence(), Confidence::High);
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::MetricId;
use super::indicator::moving_average;
use super::metric::MetricData;
use super::score::ScoredMetric;

/// Default cache lifetime for a metric value.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Directional reading of a single metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    Bullish,
    Neutral,
    Bearish,
}

impl Signal {
    /// Multiplier applied to the metric weight.
    #[must_use]
    pub const fn factor(self) -> f64 {
        match self {
            Self::Bullish => 1.0,
            Self::Neutral => 0.0,
            Self::Bearish => -1.0,
        }
    }

    const fn invert(self) -> Self {
        match self {
            Self::Bullish => Self::Bearish,
            Self::Neutral => Self::Neutral,
            Self::Bearish => Self::Bullish,
        }
    }
}

/// Scoring strategy bound to a metric.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Scorer {
    /// Absolute cutoffs.
    ///
    /// Normal direction: bullish above `bull`, bearish below `bear`.
    /// Inverted (valuation-style metrics): bullish below `bull`, bearish
    /// above `bear`.
    Threshold {
        bull: f64,
        bear: f64,
        #[serde(default)]
        inverted: bool,
    },
    /// Relative to a trailing moving average.
    ///
    /// Bullish above `MA + |MA|·delta`, bearish below `MA - |MA|·delta`.
    Multiplier {
        window: usize,
        delta: f64,
        #[serde(default)]
        inverted: bool,
    },
}

impl Scorer {
    #[must_use]
    pub const fn threshold(bull: f64, bear: f64, inverted: bool) -> Self {
        Self::Threshold {
            bull,
            bear,
            inverted,
        }
    }

    #[must_use]
    pub const fn multiplier(window: usize, delta: f64, inverted: bool) -> Self {
        Self::Multiplier {
            window,
            delta,
            inverted,
        }
    }

    /// Check the strategy parameters.
    pub fn validate(&self) -> Result<(), DomainError> {
        match *self {
            Self::Threshold {
                bull,
                bear,
                inverted,
            } => {
                if !bull.is_finite() || !bear.is_finite() {
                    return Err(DomainError::InvalidThresholds {
                        bull,
                        bear,
                        reason: "thresholds must be finite",
                    });
                }
                if !inverted && bull < bear {
                    return Err(DomainError::InvalidThresholds {
                        bull,
                        bear,
                        reason: "bull must be >= bear",
                    });
                }
                if inverted && bull > bear {
                    return Err(DomainError::InvalidThresholds {
                        bull,
                        bear,
                        reason: "inverted scorer needs bull <= bear",
                    });
                }
                Ok(())
            }
            Self::Multiplier { window, delta, .. } => {
                if window == 0 || !delta.is_finite() || delta < 0.0 {
                    return Err(DomainError::InvalidWindow { window, delta });
                }
                Ok(())
            }
        }
    }

    /// How many prior observations the strategy wants.
    #[must_use]
    pub const fn lookback(&self) -> usize {
        match *self {
            Self::Threshold { .. } => 0,
            Self::Multiplier { window, .. } => window.saturating_sub(1),
        }
    }

    /// Directional signal for `value`.
    ///
    /// `trailing` holds prior observations, oldest first. Returns `None`
    /// when any input is non-finite.
    #[must_use]
    pub fn signal(&self, value: f64, trailing: &[f64]) -> Option<Signal> {
        if !value.is_finite() {
            return None;
        }
        match *self {
            Self::Threshold {
                bull,
                bear,
                inverted,
            } => {
                let signal = if inverted {
                    if value < bull {
                        Signal::Bullish
                    } else if value > bear {
                        Signal::Bearish
                    } else {
                        Signal::Neutral
                    }
                } else if value > bull {
                    Signal::Bullish
                } else if value < bear {
                    Signal::Bearish
                } else {
                    Signal::Neutral
                };
                Some(signal)
            }
            Self::Multiplier {
                window,
                delta,
                inverted,
            } => {
                let keep = window.saturating_sub(1).min(trailing.len());
                let mut series: Vec<f64> = trailing[trailing.len() - keep..].to_vec();
                series.push(value);
                let ma = moving_average(&series)?;
                let band = ma.abs() * delta;

                let signal = if value > ma + band {
                    Signal::Bullish
                } else if value < ma - band {
                    Signal::Bearish
                } else {
                    Signal::Neutral
                };
                Some(if inverted { signal.invert() } else { signal })
            }
        }
    }
}

/// Immutable per-run description of how a metric is weighted and scored.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSpec {
    pub id: MetricId,
    pub weight: f64,
    pub scorer: Scorer,
    /// How long a retrieved value stays fresh in the cache.
    pub ttl: Duration,
}

impl MetricSpec {
    #[must_use]
    pub fn new(id: MetricId, weight: f64, scorer: Scorer) -> Self {
        Self {
            id,
            weight,
            scorer,
            ttl: DEFAULT_TTL,
        }
    }

    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Check weight and scorer parameters.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.weight.is_finite() || self.weight <= 0.0 {
            return Err(DomainError::InvalidWeight {
                weight: self.weight,
            });
        }
        self.scorer.validate()
    }
}

/// Convert a retrieved value into a weighted score.
///
/// Failed retrievals, missing values and non-finite inputs all produce a
/// zero score with `LOW` confidence. Otherwise confidence follows the tier:
/// `HIGH` for primary, `MEDIUM` for backup.
#[must_use]
pub fn score_metric(spec: &MetricSpec, data: &MetricData, trailing: &[f64]) -> ScoredMetric {
    let Some(value) = data.value() else {
        return ScoredMetric::neutral(data);
    };
    match spec.scorer.signal(value, trailing) {
        Some(signal) if spec.weight.is_finite() && spec.weight > 0.0 => {
            ScoredMetric::from_data(data, signal.factor(), spec.weight)
        }
        _ => ScoredMetric::neutral(data),
    }
}
