//! Operator implementation backing the CLI.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::signal;
use tracing::{info, warn};

use crate::domain::{DailyRegime, Snapshot};
use crate::error::{Error, Result};
use crate::infrastructure::bootstrap::{Runtime, Storage};
use crate::infrastructure::config::Config;
use crate::port::inbound::RegimeOperator;
use crate::port::outbound::{CacheStore, MetricStatus};

/// Use-cases bound to one loaded configuration.
pub struct Operator {
    config: Config,
}

impl Operator {
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[async_trait]
impl RegimeOperator for Operator {
    fn metric_count(&self) -> usize {
        self.config.metrics.len()
    }

    async fn snapshot(&self) -> Result<Snapshot> {
        let runtime = Runtime::build(&self.config)?;

        let result = tokio::select! {
            result = runtime.snapshot() => result,
            _ = signal::ctrl_c() => {
                info!("Shutdown signal received");
                Err(Error::Interrupted)
            }
        };

        if let Err(e) = runtime.shutdown() {
            warn!(error = %e, "Failed to flush storage");
        }
        result
    }

    fn history(&self, days: u32) -> Result<Vec<DailyRegime>> {
        let storage = Storage::open(&self.config)?;
        storage.history_replay(&self.config).last_days(days)
    }

    fn health(&self, since: DateTime<Utc>) -> Result<Vec<MetricStatus>> {
        let storage = Storage::open(&self.config)?;
        storage.audit.statuses_since(since)
    }

    fn clear_cache(&self) -> Result<usize> {
        let storage = Storage::open(&self.config)?;
        let removed = storage.cache.clear()?;
        storage.flush()?;
        info!(removed, "Cache cleared");
        Ok(removed)
    }
}
