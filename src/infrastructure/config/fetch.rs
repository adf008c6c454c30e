//! Retrieval, breaker, network, cycle and aggregation settings.

use std::time::Duration;

use serde::Deserialize;

use crate::application::{BreakerPolicy, RetryPolicy};
use crate::domain::AggregatePolicy;
use crate::port::outbound::HistoryBucket;

/// Retry schedule and per-attempt timeouts.
#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
    /// Primary attempts per fetch, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Delay before the second attempt (milliseconds).
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,
    /// Hard timeout of each primary attempt (milliseconds).
    #[serde(default = "default_attempt_timeout_ms")]
    pub attempt_timeout_ms: u64,
    /// Hard timeout of the backup attempt (milliseconds).
    #[serde(default = "default_attempt_timeout_ms")]
    pub backup_timeout_ms: u64,
}

fn default_max_attempts() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    2000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_attempt_timeout_ms() -> u64 {
    8000
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            attempt_timeout_ms: default_attempt_timeout_ms(),
            backup_timeout_ms: default_attempt_timeout_ms(),
        }
    }
}

impl FetchConfig {
    #[must_use]
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            backoff_multiplier: self.backoff_multiplier,
            attempt_timeout: Duration::from_millis(self.attempt_timeout_ms),
            backup_timeout: Duration::from_millis(self.backup_timeout_ms),
        }
    }
}

/// Circuit breaker thresholds.
#[derive(Debug, Clone, Deserialize)]
pub struct BreakerConfig {
    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,
    #[serde(default = "default_cooldown_secs")]
    pub cooldown_secs: u64,
    /// Failures charged for one rate-limit response.
    #[serde(default = "default_rate_limit_penalty")]
    pub rate_limit_penalty: u32,
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_cooldown_secs() -> u64 {
    300 // 5 minutes
}

fn default_rate_limit_penalty() -> u32 {
    2
}

impl Default for BreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: default_failure_threshold(),
            cooldown_secs: default_cooldown_secs(),
            rate_limit_penalty: default_rate_limit_penalty(),
        }
    }
}

impl BreakerConfig {
    #[must_use]
    pub fn policy(&self) -> BreakerPolicy {
        BreakerPolicy {
            failure_threshold: self.failure_threshold,
            cooldown: Duration::from_secs(self.cooldown_secs),
            rate_limit_penalty: self.rate_limit_penalty,
        }
    }
}

/// Outbound connection limits.
#[derive(Debug, Clone, Deserialize)]
pub struct NetworkConfig {
    /// Concurrent provider requests across all metrics.
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,
    /// Minimum spacing between requests to the same host (milliseconds).
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_max_connections() -> usize {
    4
}

fn default_min_request_interval_ms() -> u64 {
    500
}

fn default_user_agent() -> String {
    concat!("regimewatch/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            max_connections: default_max_connections(),
            min_request_interval_ms: default_min_request_interval_ms(),
            user_agent: default_user_agent(),
        }
    }
}

/// Aggregation cycle settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CycleConfig {
    /// Wall-clock bound on one cycle.
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_deadline_secs() -> u64 {
    60
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_deadline_secs(),
        }
    }
}

impl CycleConfig {
    #[must_use]
    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }
}

/// Regime cutoffs.
#[derive(Debug, Clone, Deserialize)]
pub struct AggregateConfig {
    #[serde(default = "default_bull_cutoff")]
    pub bull_cutoff: f64,
    #[serde(default = "default_bear_cutoff")]
    pub bear_cutoff: f64,
    /// Share of LOW metrics at which aggregate confidence drops to MEDIUM.
    #[serde(default = "default_low_confidence_cutoff")]
    pub low_confidence_cutoff: f64,
}

fn default_bull_cutoff() -> f64 {
    3.0
}

fn default_bear_cutoff() -> f64 {
    -3.0
}

fn default_low_confidence_cutoff() -> f64 {
    0.3
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            bull_cutoff: default_bull_cutoff(),
            bear_cutoff: default_bear_cutoff(),
            low_confidence_cutoff: default_low_confidence_cutoff(),
        }
    }
}

impl AggregateConfig {
    #[must_use]
    pub fn policy(&self) -> AggregatePolicy {
        AggregatePolicy {
            bull_cutoff: self.bull_cutoff,
            bear_cutoff: self.bear_cutoff,
            low_confidence_cutoff: self.low_confidence_cutoff,
        }
    }
}

/// History row bucketing and audit retention.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_bucket_secs")]
    pub bucket_secs: u64,
    /// Fetch audit rows older than this are pruned on shutdown.
    #[serde(default = "default_audit_retention_days")]
    pub audit_retention_days: u32,
}

fn default_bucket_secs() -> u64 {
    3600
}

fn default_audit_retention_days() -> u32 {
    30
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            bucket_secs: default_bucket_secs(),
            audit_retention_days: default_audit_retention_days(),
        }
    }
}

impl HistoryConfig {
    #[must_use]
    pub fn bucket(&self) -> HistoryBucket {
        HistoryBucket::new(self.bucket_secs)
    }
}
