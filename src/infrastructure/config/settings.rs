//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all application settings.
//! Configuration is loaded from a TOML file; the database path can be
//! overridden with the `REGIMEWATCH_DATABASE` environment variable.
//!
//! # Example
//!
//! ```no_run
//! use regimewatch::infrastructure::config::settings::Config;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load("config.toml")?;
//!     config.init_logging();
//!     Ok(())
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;

use super::fetch::{
    AggregateConfig, BreakerConfig, CycleConfig, FetchConfig, HistoryConfig, NetworkConfig,
};
use super::logging::LoggingConfig;
use super::metrics::{default_metrics, MetricConfig};
use crate::application::MAX_ATTEMPT_TIMEOUT;
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::database`].
pub const DATABASE_ENV: &str = "REGIMEWATCH_DATABASE";

/// Main application configuration.
///
/// Load from a TOML file using [`Config::load`] or parse directly with
/// [`Config::parse_toml`]. Every section is optional.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to SQLite database file.
    ///
    /// Defaults to "regimewatch.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Retry schedule and attempt timeouts.
    #[serde(default)]
    pub fetch: FetchConfig,

    /// Per-source circuit breaker thresholds.
    #[serde(default)]
    pub breaker: BreakerConfig,

    /// Outbound connection limits.
    #[serde(default)]
    pub network: NetworkConfig,

    #[serde(default)]
    pub cycle: CycleConfig,

    /// Regime label and confidence cutoffs.
    #[serde(default)]
    pub aggregate: AggregateConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    /// Ordered metric list. The breakdown follows this order.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricConfig>,
}

fn default_database_path() -> String {
    "regimewatch.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            logging: LoggingConfig::default(),
            fetch: FetchConfig::default(),
            breaker: BreakerConfig::default(),
            network: NetworkConfig::default(),
            cycle: CycleConfig::default(),
            aggregate: AggregateConfig::default(),
            history: HistoryConfig::default(),
            metrics: default_metrics(),
        }
    }
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

impl Config {
    /// Parse configuration from TOML content.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The TOML content is malformed
    /// - Validation fails (e.g., duplicate metrics or a zero timeout)
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(path) = std::env::var(DATABASE_ENV) {
            if !path.trim().is_empty() {
                config.database = path;
            }
        }

        config.validate()?;

        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read
    /// - The TOML content is malformed
    /// - Validation fails
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Validate configuration values.
    ///
    /// Checks that all values are within acceptable ranges.
    #[allow(clippy::result_large_err)]
    pub fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }

        let fetch = &self.fetch;
        if fetch.max_attempts == 0 {
            return Err(invalid("max_attempts", "must be greater than 0").into());
        }
        if !(fetch.backoff_multiplier >= 1.0 && fetch.backoff_multiplier.is_finite()) {
            return Err(invalid("backoff_multiplier", "must be >= 1.0").into());
        }
        let cap = MAX_ATTEMPT_TIMEOUT.as_millis() as u64;
        if fetch.attempt_timeout_ms == 0 || fetch.attempt_timeout_ms > cap {
            return Err(invalid("attempt_timeout_ms", format!("must be between 1 and {cap}")).into());
        }
        if fetch.backup_timeout_ms == 0 || fetch.backup_timeout_ms > cap {
            return Err(invalid("backup_timeout_ms", format!("must be between 1 and {cap}")).into());
        }

        if self.breaker.failure_threshold == 0 {
            return Err(invalid("failure_threshold", "must be greater than 0").into());
        }
        if self.breaker.cooldown_secs == 0 {
            return Err(invalid("cooldown_secs", "must be greater than 0").into());
        }

        if self.network.max_connections == 0 {
            return Err(invalid("max_connections", "must be greater than 0").into());
        }
        if self.cycle.deadline_secs == 0 {
            return Err(invalid("deadline_secs", "must be greater than 0").into());
        }
        if self.history.bucket_secs == 0 {
            return Err(invalid("bucket_secs", "must be greater than 0").into());
        }
        if self.history.audit_retention_days == 0 {
            return Err(invalid("audit_retention_days", "must be greater than 0").into());
        }

        let aggregate = &self.aggregate;
        if !(aggregate.bull_cutoff.is_finite() && aggregate.bear_cutoff.is_finite())
            || aggregate.bull_cutoff <= aggregate.bear_cutoff
        {
            return Err(invalid("bull_cutoff", "must be greater than bear_cutoff").into());
        }
        if !(aggregate.low_confidence_cutoff > 0.0 && aggregate.low_confidence_cutoff <= 1.0) {
            return Err(invalid("low_confidence_cutoff", "must be in (0, 1]").into());
        }

        self.validate_metrics()
    }

    #[allow(clippy::result_large_err)]
    fn validate_metrics(&self) -> Result<()> {
        if self.metrics.is_empty() {
            return Err(invalid("metrics", "at least one metric is required").into());
        }

        let mut seen = HashSet::new();
        for metric in &self.metrics {
            if !seen.insert(metric.id) {
                return Err(invalid("metrics", format!("{} is configured twice", metric.id)).into());
            }
            let (primary, backup) = metric.urls()?;
            if primary == backup {
                return Err(invalid(
                    "metrics.backup",
                    format!("{}: backup must differ from primary", metric.id),
                )
                .into());
            }
            if metric.ttl_secs == 0 {
                return Err(invalid("metrics.ttl_secs", format!("{}: must be greater than 0", metric.id)).into());
            }
            metric
                .spec()
                .validate()
                .map_err(|e| invalid("metrics.scoring", format!("{}: {e}", metric.id)))?;
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MetricKind, Scorer};
    use crate::error::Error;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse_toml("").unwrap();
        assert_eq!(config.metrics.len(), 8);
        assert_eq!(config.fetch.max_attempts, 3);
        assert_eq!(config.breaker.cooldown_secs, 300);
        assert_eq!(config.cycle.deadline_secs, 60);
        assert_eq!(config.logging.format, "pretty");
        assert_eq!(config.history.audit_retention_days, 30);
    }

    #[test]
    fn metrics_are_parsed_in_order() {
        let config = Config::parse_toml(
            r#"
            [[metrics]]
            id = "rsi"
            primary = "https://a.example.com/rsi"
            backup = "https://b.example.com/rsi"
            scoring = { strategy = "threshold", bull = 30.0, bear = 70.0, inverted = true }

            [[metrics]]
            id = "hash_rate"
            primary = "https://a.example.com/hr"
            backup = "https://b.example.com/hr"
            weight = 2.0
            ttl_secs = 600
            [metrics.scoring]
            strategy = "multiplier"
            window = 7
            delta = 0.05
            "#,
        )
        .unwrap();

        assert_eq!(config.metrics[0].id, MetricKind::Rsi);
        assert_eq!(config.metrics[0].scoring, Scorer::threshold(30.0, 70.0, true));
        assert_eq!(config.metrics[1].scoring, Scorer::multiplier(7, 0.05, false));
        assert_eq!(config.metrics[1].weight, 2.0);
    }

    #[test]
    fn attempt_timeout_above_cap_is_rejected() {
        let result = Config::parse_toml("[fetch]\nattempt_timeout_ms = 15000\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "attempt_timeout_ms",
                ..
            }))
        ));
    }

    #[test]
    fn identical_backup_is_rejected() {
        let result = Config::parse_toml(
            r#"
            [[metrics]]
            id = "rsi"
            primary = "https://a.example.com/rsi"
            backup = "https://a.example.com/rsi"
            scoring = { strategy = "threshold", bull = 30.0, bear = 70.0, inverted = true }
            "#,
        );
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "metrics.backup",
                ..
            }))
        ));
    }

    #[test]
    fn unknown_metric_is_a_parse_error() {
        let result = Config::parse_toml(
            r#"
            [[metrics]]
            id = "social_volume"
            primary = "https://a.example.com"
            backup = "https://b.example.com"
            scoring = { strategy = "threshold", bull = 1.0, bear = 0.0 }
            "#,
        );
        assert!(matches!(result, Err(Error::Config(ConfigError::Parse(_)))));
    }

    #[test]
    fn misordered_thresholds_are_rejected() {
        let result = Config::parse_toml(
            r#"
            [[metrics]]
            id = "fear_greed_index"
            primary = "https://a.example.com"
            backup = "https://b.example.com"
            scoring = { strategy = "threshold", bull = 30.0, bear = 70.0 }
            "#,
        );
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "metrics.scoring",
                ..
            }))
        ));
    }

    #[test]
    fn inverted_cutoffs_are_rejected() {
        let result = Config::parse_toml("[aggregate]\nbull_cutoff = -1.0\nbear_cutoff = 1.0\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "bull_cutoff",
                ..
            }))
        ));
    }

    #[test]
    fn zero_audit_retention_is_rejected() {
        let result = Config::parse_toml("[history]\naudit_retention_days = 0\n");
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::InvalidValue {
                field: "audit_retention_days",
                ..
            }))
        ));
    }
}
