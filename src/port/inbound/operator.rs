//! Operator capability surface consumed by inbound adapters.
//!
//! The CLI talks only to this trait. The composition root provides the
//! implementation, already bound to a loaded configuration.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{DailyRegime, Snapshot};
use crate::error::Result;
use crate::port::outbound::MetricStatus;

#[async_trait]
pub trait RegimeOperator: Send + Sync {
    /// Number of metrics a snapshot will fetch.
    fn metric_count(&self) -> usize;

    /// Run one full cycle and publish a snapshot.
    ///
    /// An interrupt abandons the cycle with [`crate::error::Error::Interrupted`];
    /// durable state is flushed either way.
    async fn snapshot(&self) -> Result<Snapshot>;

    /// Replay the trailing `days` of stored history, oldest day first.
    fn history(&self, days: u32) -> Result<Vec<DailyRegime>>;

    /// Latest recorded fetch outcome per metric since `since`.
    fn health(&self, since: DateTime<Utc>) -> Result<Vec<MetricStatus>>;

    /// Drop every cached metric value. Returns the number removed.
    fn clear_cache(&self) -> Result<usize>;
}
