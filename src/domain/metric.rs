//! Retrieved metric values and the tier that produced them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::MetricId;

/// Which tier of the fallback chain produced a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceTier {
    Primary,
    Backup,
    /// Both tiers failed; the value is absent.
    Failed,
}

impl SourceTier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Backup => "backup",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for SourceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "primary" => Ok(Self::Primary),
            "backup" => Ok(Self::Backup),
            "failed" => Ok(Self::Failed),
            other => Err(format!("unknown source tier '{other}'")),
        }
    }
}

/// A single retrieved metric observation.
///
/// `is_fallback` is derived from the tier so it can never disagree with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricData {
    metric_name: MetricId,
    value: Option<f64>,
    timestamp: DateTime<Utc>,
    source_tier: SourceTier,
}

impl MetricData {
    /// A value served by the primary provider.
    #[must_use]
    pub fn primary(metric: MetricId, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            metric_name: metric,
            value: Some(value),
            timestamp,
            source_tier: SourceTier::Primary,
        }
    }

    /// A value served by the backup provider.
    #[must_use]
    pub fn backup(metric: MetricId, value: f64, timestamp: DateTime<Utc>) -> Self {
        Self {
            metric_name: metric,
            value: Some(value),
            timestamp,
            source_tier: SourceTier::Backup,
        }
    }

    /// The degraded result returned when every tier failed.
    #[must_use]
    pub fn failed(metric: MetricId, timestamp: DateTime<Utc>) -> Self {
        Self {
            metric_name: metric,
            value: None,
            timestamp,
            source_tier: SourceTier::Failed,
        }
    }

    #[must_use]
    pub fn metric(&self) -> &MetricId {
        &self.metric_name
    }

    /// The raw value; `None` when the metric could not be retrieved.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.value
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub fn tier(&self) -> SourceTier {
        self.source_tier
    }

    /// True unless the primary tier produced this value.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        self.source_tier != SourceTier::Primary
    }
}

/// The closed set of metrics this engine knows how to retrieve.
///
/// Provider adapters are dispatched on this enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    FearGreedIndex,
    HashRate,
    ExchangeNetFlows,
    ActiveAddresses,
    PerpetualFundingRates,
    OpenInterest,
    MvrvRatio,
    Rsi,
}

impl MetricKind {
    pub const ALL: [Self; 8] = [
        Self::FearGreedIndex,
        Self::HashRate,
        Self::ExchangeNetFlows,
        Self::ActiveAddresses,
        Self::PerpetualFundingRates,
        Self::OpenInterest,
        Self::MvrvRatio,
        Self::Rsi,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FearGreedIndex => "fear_greed_index",
            Self::HashRate => "hash_rate",
            Self::ExchangeNetFlows => "exchange_net_flows",
            Self::ActiveAddresses => "active_addresses",
            Self::PerpetualFundingRates => "perpetual_funding_rates",
            Self::OpenInterest => "open_interest",
            Self::MvrvRatio => "mvrv_ratio",
            Self::Rsi => "rsi",
        }
    }

    #[must_use]
    pub fn id(self) -> MetricId {
        MetricId::new(self.as_str())
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown metric '{s}'"))
    }
}
