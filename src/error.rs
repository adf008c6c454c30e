//! Error types for the crate.
//!
//! Per-metric retrieval failures are modelled by [`FetchError`] and are always
//! recovered locally by the fetch orchestrator. The crate-level [`Error`] is
//! reserved for failures that stop a whole operation: bad configuration,
//! storage problems, or a cycle that cannot run at all.

use std::time::Duration;

use thiserror::Error;

use crate::domain::error::DomainError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),

    #[error("{0}")]
    Other(String),
}

/// Failure of a single retrieval attempt against one provider tier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    /// Connection refused, DNS failure, non-success HTTP status.
    #[error("network error: {0}")]
    Network(String),

    /// The attempt exceeded its hard timeout.
    #[error("timed out after {elapsed:?}")]
    Timeout { elapsed: Duration },

    /// The provider answered with a payload we could not interpret.
    #[error("parse error: {0}")]
    Parse(String),

    /// The provider asked us to slow down.
    #[error("rate limited (retry after {retry_after:?})")]
    RateLimited { retry_after: Option<Duration> },

    /// The circuit breaker for this source refused the attempt.
    #[error("circuit open for {source_id}")]
    CircuitOpen { source_id: String },

    /// Both tiers failed for a metric.
    #[error("all sources unavailable for {metric}")]
    AllSourcesUnavailable { metric: String },
}

impl FetchError {
    /// Whether another attempt against the same tier may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::Timeout { .. } | Self::RateLimited { .. }
        )
    }

    /// Short label used for audit rows and log fields.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network",
            Self::Timeout { .. } => "timeout",
            Self::Parse(_) => "parse",
            Self::RateLimited { .. } => "rate_limited",
            Self::CircuitOpen { .. } => "circuit_open",
            Self::AllSourcesUnavailable { .. } => "all_sources_unavailable",
        }
    }
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("no metrics configured")]
    NoMetricsConfigured,

    #[error("cycle deadline reached with no metric reporting ({pending} pending)")]
    CycleDeadline { pending: usize },

    #[error("interrupted")]
    Interrupted,
}

pub type Result<T> = std::result::Result<T, Error>;
