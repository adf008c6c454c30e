//! Domain validation errors.
//!
//! These errors are returned when domain invariants are violated, for
//! example by `try_new` constructors or by the aggregator when it is handed
//! an empty breakdown.

use thiserror::Error;

/// Errors that occur when domain invariants are violated.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    /// The aggregator needs at least one scored metric.
    #[error("cannot aggregate an empty breakdown")]
    EmptyBreakdown,

    /// Metric weights must be positive and finite.
    #[error("weight must be positive and finite, got {weight}")]
    InvalidWeight {
        /// The rejected weight.
        weight: f64,
    },

    /// Threshold pairs must be finite and ordered for their direction.
    #[error("invalid thresholds bull={bull} bear={bear}: {reason}")]
    InvalidThresholds {
        /// Bullish cutoff.
        bull: f64,
        /// Bearish cutoff.
        bear: f64,
        /// Why the pair was rejected.
        reason: &'static str,
    },

    /// Moving-average parameters out of range.
    #[error("invalid moving-average parameters window={window} delta={delta}")]
    InvalidWindow {
        /// Trailing window length.
        window: usize,
        /// Band half-width as a fraction of the average.
        delta: f64,
    },
}
