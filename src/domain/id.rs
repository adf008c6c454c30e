//! Identifier types with proper encapsulation.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::metric::SourceTier;

/// Metric identifier - newtype for type safety.
///
/// The inner String is private to ensure all construction goes through
/// the defined constructors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricId(String);

impl MetricId {
    /// Create a new `MetricId` from a string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the metric ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for MetricId {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for MetricId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Identity of one retrieval tier of one metric.
///
/// Every source gets its own circuit breaker, so the backup of a metric is
/// never gated by an outage of its primary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceId {
    metric: MetricId,
    tier: SourceTier,
}

impl SourceId {
    /// Primary tier of `metric`.
    #[must_use]
    pub fn primary(metric: &MetricId) -> Self {
        Self {
            metric: metric.clone(),
            tier: SourceTier::Primary,
        }
    }

    /// Backup tier of `metric`.
    #[must_use]
    pub fn backup(metric: &MetricId) -> Self {
        Self {
            metric: metric.clone(),
            tier: SourceTier::Backup,
        }
    }

    #[must_use]
    pub fn metric(&self) -> &MetricId {
        &self.metric
    }

    #[must_use]
    pub fn tier(&self) -> SourceTier {
        self.tier
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tier.as_str(), self.metric)
    }
}

/// Key of a cache entry: metric identity plus a bucket label.
///
/// Latest-value lookups use the `latest` bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    /// Key for the most recent value of `metric`.
    #[must_use]
    pub fn latest(metric: &MetricId) -> Self {
        Self::with_bucket(metric, "latest")
    }

    /// Key for `metric` in an arbitrary bucket.
    #[must_use]
    pub fn with_bucket(metric: &MetricId, bucket: &str) -> Self {
        Self(format!("{metric}/{bucket}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The metric portion of the key.
    #[must_use]
    pub fn metric(&self) -> &str {
        self.0.split_once('/').map_or(self.0.as_str(), |(m, _)| m)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
