//! Canonical test configurations.
//!
//! Single source of truth for config structs used across tests.
//! Avoids each test module defining its own slightly-different defaults.

use std::path::Path;
use std::time::Duration;

use crate::application::{BreakerPolicy, RetryPolicy};
use crate::domain::MetricKind;
use crate::infrastructure::config::metrics::{default_metrics, MetricConfig};
use crate::infrastructure::config::Config;

/// Retry policy with millisecond backoff and short timeouts.
pub fn retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        backoff_base: Duration::from_millis(1),
        backoff_multiplier: 2.0,
        attempt_timeout: Duration::from_millis(500),
        backup_timeout: Duration::from_millis(500),
    }
}

/// Breaker policy matching production thresholds.
pub fn breaker() -> BreakerPolicy {
    BreakerPolicy::default()
}

/// Default metric set with every provider URL rewritten to `base_url`.
///
/// Primary endpoints are served at `/primary/<metric>` and backups at
/// `/backup/<metric>`, so a single mock server can script both tiers.
pub fn metrics_at(base_url: &str) -> Vec<MetricConfig> {
    let base = base_url.trim_end_matches('/');
    default_metrics()
        .into_iter()
        .map(|mut metric| {
            metric.primary = format!("{base}/primary/{}", metric.id);
            metric.backup = format!("{base}/backup/{}", metric.id);
            metric
        })
        .collect()
}

/// Full config pointing at `database`, with every provider at `base_url`
/// and a fast retry schedule.
pub fn offline(database: &Path, base_url: &str) -> Config {
    let mut config = Config {
        database: database.display().to_string(),
        metrics: metrics_at(base_url),
        ..Config::default()
    };
    config.fetch.backoff_base_ms = 1;
    config.fetch.attempt_timeout_ms = 500;
    config.fetch.backup_timeout_ms = 500;
    config.network.min_request_interval_ms = 0;
    config.cycle.deadline_secs = 10;
    config
}

/// Same as [`offline`] but limited to the given metrics, in order.
pub fn offline_with(database: &Path, base_url: &str, kinds: &[MetricKind]) -> Config {
    let mut config = offline(database, base_url);
    config.metrics = kinds
        .iter()
        .filter_map(|kind| config.metrics.iter().find(|m| m.id == *kind).cloned())
        .collect();
    config
}
