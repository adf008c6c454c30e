//! Exchange-independent domain logic: metric values, scoring and
//! aggregation. Nothing in here performs I/O.

pub mod error;
pub mod id;
pub mod indicator;
pub mod metric;
pub mod regime;
pub mod score;
pub mod scoring;
pub mod window;

pub use error::DomainError;
pub use id::{CacheKey, MetricId, SourceId};
pub use metric::{MetricData, MetricKind, SourceTier};
pub use regime::{
    aggregate, AggregatePolicy, BreakdownEntry, DailyRegime, Regime, RegimeLabel, Snapshot,
    ENGINE_VERSION,
};
pub use score::{Confidence, ScoredMetric};
pub use scoring::{score_metric, MetricSpec, Scorer, Signal, DEFAULT_TTL};
pub use window::{trailing_days, trailing_hours, window_start};
