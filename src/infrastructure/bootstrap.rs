//! Composition root: wires configuration into stores, adapters and services.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::info;

use crate::adapter::outbound::provider::{build_source, HttpClient, ProviderGovernor};
use crate::adapter::outbound::sqlite::{
    create_pool, run_migrations, DbPool, SqliteAuditLog, SqliteCacheStore, SqliteHistoryStore,
};
use crate::application::{
    CircuitBreaker, FanoutAudit, FetchContext, FetchOrchestrator, HealthTracker, HistoryReplay,
    MetricBinding, RegimeEngine,
};
use crate::domain::{trailing_days, MetricSpec, Snapshot};
use crate::error::Result;
use crate::infrastructure::config::Config;
use crate::port::outbound::CacheStore;

/// Durable stores backed by the configured SQLite database.
pub struct Storage {
    pub pool: DbPool,
    pub cache: Arc<SqliteCacheStore>,
    pub history: Arc<SqliteHistoryStore>,
    pub audit: Arc<SqliteAuditLog>,
}

impl Storage {
    /// Open the database and apply pending migrations.
    pub fn open(config: &Config) -> Result<Self> {
        let pool = create_pool(&config.database)?;
        run_migrations(&pool)?;
        info!(database = %config.database, "Database ready");
        Ok(Self {
            cache: Arc::new(SqliteCacheStore::new(pool.clone())),
            history: Arc::new(SqliteHistoryStore::new(pool.clone())),
            audit: Arc::new(SqliteAuditLog::new(pool.clone())),
            pool,
        })
    }

    /// Daily replay over stored history for the configured metrics.
    #[must_use]
    pub fn history_replay(&self, config: &Config) -> HistoryReplay {
        HistoryReplay::new(
            self.history.clone(),
            config.metrics.iter().map(|m| m.spec()).collect(),
            config.aggregate.policy(),
        )
    }

    /// Drop fetch audit rows older than `retention_days`.
    pub fn prune_audit(&self, retention_days: u32) -> Result<usize> {
        self.audit
            .prune_before(trailing_days(Utc::now(), retention_days))
    }

    /// Checkpoint the write-ahead log.
    pub fn flush(&self) -> Result<()> {
        self.cache.flush()
    }
}

/// Everything a snapshot run needs, built once per process.
pub struct Runtime {
    storage: Storage,
    health: Arc<HealthTracker>,
    engine: RegimeEngine,
    audit_retention_days: u32,
}

impl Runtime {
    /// Build the fetch context, provider adapters and engine.
    pub fn build(config: &Config) -> Result<Self> {
        let storage = Storage::open(config)?;

        let health = Arc::new(HealthTracker::new());
        let audit = FanoutAudit::new(vec![health.clone(), storage.audit.clone()]);
        let ctx = FetchContext::new(
            Arc::new(CircuitBreaker::new(config.breaker.policy())),
            storage.cache.clone(),
            storage.history.clone(),
            Arc::new(audit),
        );
        let orchestrator = Arc::new(FetchOrchestrator::new(
            ctx,
            config.fetch.retry_policy(),
            config.history.bucket(),
        ));

        let governor = Arc::new(ProviderGovernor::new(
            config.network.max_connections,
            Duration::from_millis(config.network.min_request_interval_ms),
        ));
        let http = Arc::new(HttpClient::new(&config.network.user_agent, governor));

        let mut bindings = Vec::with_capacity(config.metrics.len());
        for metric in &config.metrics {
            let (primary, backup) = metric.urls()?;
            bindings.push(MetricBinding::new(
                metric.spec(),
                build_source(metric.id, primary, backup, http.clone()),
            ));
        }

        let engine = RegimeEngine::new(
            orchestrator,
            bindings,
            config.aggregate.policy(),
            config.cycle.deadline(),
        );
        info!(metrics = config.metrics.len(), "Runtime ready");

        Ok(Self {
            storage,
            health,
            engine,
            audit_retention_days: config.history.audit_retention_days,
        })
    }

    #[must_use]
    pub fn engine(&self) -> &RegimeEngine {
        &self.engine
    }

    #[must_use]
    pub fn health(&self) -> &Arc<HealthTracker> {
        &self.health
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn specs(&self) -> Vec<MetricSpec> {
        self.engine
            .metrics()
            .iter()
            .map(|b| b.spec.clone())
            .collect()
    }

    /// Run one cycle.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        self.engine.run_cycle().await
    }

    /// Prune expired audit rows and flush durable state. Call once before
    /// exit.
    pub fn shutdown(&self) -> Result<()> {
        let pruned = self.storage.prune_audit(self.audit_retention_days)?;
        self.engine.orchestrator().context().flush()?;
        info!(pruned, "Runtime shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::domain::{MetricId, SourceTier};
    use crate::port::outbound::{AuditSink, FetchAttempt};

    fn config(dir: &tempfile::TempDir) -> Config {
        Config {
            database: dir.path().join("regimewatch.db").display().to_string(),
            ..Config::default()
        }
    }

    fn attempt(age_days: i64) -> FetchAttempt {
        let mut attempt = FetchAttempt::succeeded(
            &MetricId::new("hash_rate"),
            SourceTier::Primary,
            Duration::from_millis(5),
        );
        attempt.at = Utc::now() - chrono::Duration::days(age_days);
        attempt
    }

    #[test]
    fn runtime_wires_every_configured_metric() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::build(&config(&dir)).unwrap();
        assert_eq!(runtime.engine().metrics().len(), 8);
        assert_eq!(runtime.specs()[0].id, MetricId::new("fear_greed_index"));
    }

    #[test]
    fn shutdown_prunes_expired_audit_rows() {
        let dir = tempfile::tempdir().unwrap();
        let runtime = Runtime::build(&config(&dir)).unwrap();
        runtime.storage().audit.record(&attempt(90));
        runtime.storage().audit.record(&attempt(1));

        runtime.shutdown().unwrap();

        let remaining = runtime
            .storage()
            .audit
            .statuses_since(chrono::DateTime::UNIX_EPOCH)
            .unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].successes, 1);
    }

    #[test]
    fn retention_window_is_configurable() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::open(&config(&dir)).unwrap();
        storage.audit.record(&attempt(10));
        storage.audit.record(&attempt(3));

        assert_eq!(storage.prune_audit(30).unwrap(), 0);
        assert_eq!(storage.prune_audit(7).unwrap(), 1);
    }
}
