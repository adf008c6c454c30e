//! Configuration loading from files and the environment.

use std::path::PathBuf;

use regimewatch::domain::{MetricKind, Scorer};
use regimewatch::error::{ConfigError, Error};
use regimewatch::infrastructure::config::settings::DATABASE_ENV;
use regimewatch::infrastructure::config::Config;

fn example_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.example.toml")
}

#[test]
fn example_config_matches_builtin_defaults() {
    let example = Config::load(example_path()).expect("example config loads");
    let defaults = Config::default();

    assert_eq!(example.metrics.len(), defaults.metrics.len());
    for (ours, builtin) in example.metrics.iter().zip(&defaults.metrics) {
        assert_eq!(ours.id, builtin.id);
        assert_eq!(ours.primary, builtin.primary);
        assert_eq!(ours.backup, builtin.backup);
        assert_eq!(ours.scoring, builtin.scoring);
        assert_eq!(ours.weight, builtin.weight);
    }
    assert_eq!(example.fetch.max_attempts, defaults.fetch.max_attempts);
    assert_eq!(example.breaker.cooldown_secs, defaults.breaker.cooldown_secs);
    assert_eq!(example.aggregate.bull_cutoff, defaults.aggregate.bull_cutoff);
    assert_eq!(example.history.bucket_secs, defaults.history.bucket_secs);
    assert_eq!(
        example.history.audit_retention_days,
        defaults.history.audit_retention_days
    );
}

#[test]
fn missing_file_is_a_read_error() {
    let result = Config::load("/nonexistent/regimewatch.toml");
    assert!(matches!(result, Err(Error::Config(ConfigError::ReadFile(_)))));
}

#[test]
fn database_can_be_overridden_from_env() {
    std::env::set_var(DATABASE_ENV, "/tmp/override.db");
    let config = Config::parse_toml("database = \"file.db\"\n");
    std::env::remove_var(DATABASE_ENV);

    assert_eq!(config.unwrap().database, "/tmp/override.db");
}

#[test]
fn duplicate_metrics_are_rejected() {
    let result = Config::parse_toml(
        r#"
        [[metrics]]
        id = "rsi"
        primary = "https://a.example.com/rsi"
        backup = "https://b.example.com/rsi"
        scoring = { strategy = "threshold", bull = 30.0, bear = 70.0, inverted = true }

        [[metrics]]
        id = "rsi"
        primary = "https://c.example.com/rsi"
        backup = "https://d.example.com/rsi"
        scoring = { strategy = "threshold", bull = 30.0, bear = 70.0, inverted = true }
        "#,
    );
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "metrics",
            ..
        }))
    ));
}

#[test]
fn subset_of_metrics_keeps_file_order() {
    let config = Config::parse_toml(
        r#"
        [[metrics]]
        id = "open_interest"
        primary = "https://a.example.com/oi"
        backup = "https://b.example.com/oi"
        scoring = { strategy = "multiplier", window = 14, delta = 0.1 }

        [[metrics]]
        id = "fear_greed_index"
        primary = "https://a.example.com/fg"
        backup = "https://b.example.com/fg"
        weight = 1.5
        scoring = { strategy = "threshold", bull = 75.0, bear = 25.0 }
        "#,
    )
    .unwrap();

    let kinds: Vec<_> = config.metrics.iter().map(|m| m.id).collect();
    assert_eq!(kinds, [MetricKind::OpenInterest, MetricKind::FearGreedIndex]);
    assert_eq!(config.metrics[0].scoring, Scorer::multiplier(14, 0.1, false));
    assert_eq!(config.metrics[1].spec().weight, 1.5);
}

#[test]
fn zero_deadline_is_rejected() {
    let result = Config::parse_toml("[cycle]\ndeadline_secs = 0\n");
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InvalidValue {
            field: "deadline_secs",
            ..
        }))
    ));
}
