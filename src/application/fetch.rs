//! Tiered metric retrieval.
//!
//! [`FetchOrchestrator::fetch`] resolves one metric through the fallback
//! chain:
//!
//! 1. a fresh cache entry, returned without touching the network or the
//!    breakers;
//! 2. the primary provider, guarded by its breaker, with bounded retries and
//!    exponential backoff, each attempt under a hard timeout;
//! 3. the backup provider, once, through its own breaker and timeout;
//! 4. a degraded [`MetricData`] with tier `failed` and no value.
//!
//! `fetch` never returns an error. Failed results are not cached.
//!
//! Each attempt first waits for [`MetricSource::admit`]. The attempt timeout
//! and the audited latency start only once the source has admitted the call,
//! so queueing behind other metrics never counts against a provider.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::{sleep, timeout, Instant};
use tracing::{debug, error, info, warn};

use crate::application::breaker::CircuitBreaker;
use crate::domain::{CacheKey, MetricData, MetricId, MetricSpec, SourceId, SourceTier};
use crate::error::{FetchError, Result};
use crate::port::outbound::{
    AuditSink, CacheStore, FetchAttempt, HistoryBucket, HistoryStore, MetricSource,
};

/// Hard upper bound on a single provider attempt.
pub const MAX_ATTEMPT_TIMEOUT: Duration = Duration::from_secs(10);

/// Retry and timeout settings for provider calls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Attempts against the primary tier, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt.
    pub backoff_base: Duration,
    /// Growth factor applied to each following delay.
    pub backoff_multiplier: f64,
    /// Hard timeout of each primary attempt.
    pub attempt_timeout: Duration,
    /// Hard timeout of the backup attempt.
    pub backup_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(2),
            backoff_multiplier: 2.0,
            attempt_timeout: Duration::from_secs(8),
            backup_timeout: Duration::from_secs(8),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    ///
    /// With the defaults this yields 2s, 4s, 8s, ...
    #[must_use]
    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt.saturating_sub(1)).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        let millis = self.backoff_base.as_millis() as f64 * factor;
        if millis.is_finite() && millis < u64::MAX as f64 {
            Duration::from_millis(millis as u64)
        } else {
            Duration::from_millis(u64::MAX)
        }
    }
}

/// Process-wide state owned by the fetch subsystem.
///
/// Built once at startup and shared by every metric task. Nothing outside
/// the orchestrator mutates the breakers or the cache.
#[derive(Clone)]
pub struct FetchContext {
    pub breakers: Arc<CircuitBreaker>,
    pub cache: Arc<dyn CacheStore>,
    pub history: Arc<dyn HistoryStore>,
    pub audit: Arc<dyn AuditSink>,
}

impl FetchContext {
    #[must_use]
    pub fn new(
        breakers: Arc<CircuitBreaker>,
        cache: Arc<dyn CacheStore>,
        history: Arc<dyn HistoryStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            breakers,
            cache,
            history,
            audit,
        }
    }

    /// Flush durable state. Call once on shutdown.
    pub fn flush(&self) -> Result<()> {
        self.cache.flush()
    }
}

/// Drives the tiered retrieval protocol for individual metrics.
pub struct FetchOrchestrator {
    ctx: FetchContext,
    retry: RetryPolicy,
    bucket: HistoryBucket,
}

impl FetchOrchestrator {
    #[must_use]
    pub fn new(ctx: FetchContext, retry: RetryPolicy, bucket: HistoryBucket) -> Self {
        Self { ctx, retry, bucket }
    }

    #[must_use]
    pub fn context(&self) -> &FetchContext {
        &self.ctx
    }

    #[must_use]
    pub fn bucket(&self) -> HistoryBucket {
        self.bucket
    }

    /// Resolve `spec` through cache, primary, backup and degraded tiers.
    pub async fn fetch(&self, spec: &MetricSpec, source: &dyn MetricSource) -> MetricData {
        let started = Instant::now();
        let key = CacheKey::latest(&spec.id);
        match self.ctx.cache.get(&key) {
            Ok(Some(cached)) => {
                debug!(metric = %spec.id, tier = %cached.tier(), "Cache hit");
                return cached;
            }
            Ok(None) => {}
            Err(e) => warn!(metric = %spec.id, error = %e, "Cache read failed"),
        }

        let (primary_name, backup_name) = source.providers();

        let primary_error = match self.fetch_primary(&spec.id, source).await {
            Ok(value) => {
                info!(metric = %spec.id, provider = primary_name, value, "Tier 1: primary served");
                let data = MetricData::primary(spec.id.clone(), value, Utc::now());
                self.remember(&key, &data, spec);
                return data;
            }
            Err(e) => e,
        };
        warn!(
            metric = %spec.id,
            error = %primary_error,
            provider = backup_name,
            "Tier 1 exhausted, attempting backup"
        );

        match self.fetch_backup(&spec.id, source).await {
            Ok(value) => {
                info!(metric = %spec.id, provider = backup_name, value, "Tier 2: backup served");
                let data = MetricData::backup(spec.id.clone(), value, Utc::now());
                self.remember(&key, &data, spec);
                data
            }
            Err(backup_error) => {
                error!(
                    metric = %spec.id,
                    primary_error = %primary_error,
                    backup_error = %backup_error,
                    "All sources failed, degrading to neutral"
                );
                self.ctx.audit.record(&FetchAttempt::failed(
                    &spec.id,
                    SourceTier::Failed,
                    started.elapsed(),
                    FetchError::AllSourcesUnavailable {
                        metric: spec.id.to_string(),
                    },
                ));
                MetricData::failed(spec.id.clone(), Utc::now())
            }
        }
    }

    async fn fetch_primary(
        &self,
        metric: &MetricId,
        source: &dyn MetricSource,
    ) -> std::result::Result<f64, FetchError> {
        let source_id = SourceId::primary(metric);
        let mut last_error = FetchError::CircuitOpen {
            source_id: source_id.to_string(),
        };

        for attempt in 1..=self.retry.max_attempts.max(1) {
            if !self.ctx.breakers.is_available(&source_id) {
                debug!(source = %source_id, attempt, "Breaker refused primary attempt");
                return Err(last_error);
            }

            let admission = source.admit(SourceTier::Primary).await?;
            debug!(metric = %metric, attempt, "Tier 1: attempting primary");
            let started = Instant::now();
            let outcome = bounded(source.fetch_primary(), self.retry.attempt_timeout).await;
            let latency = started.elapsed();
            drop(admission);

            let err = match outcome {
                Ok(value) => {
                    self.ctx.breakers.report_success(&source_id);
                    self.ctx
                        .audit
                        .record(&FetchAttempt::succeeded(metric, SourceTier::Primary, latency));
                    return Ok(value);
                }
                Err(err) => err,
            };

            self.ctx.audit.record(&FetchAttempt::failed(
                metric,
                SourceTier::Primary,
                latency,
                err.clone(),
            ));
            self.charge(&source_id, &err);
            warn!(
                metric = %metric,
                attempt,
                latency_ms = latency.as_millis() as u64,
                error = %err,
                "Primary attempt failed"
            );

            if !err.is_retryable() {
                return Err(err);
            }
            if attempt >= self.retry.max_attempts {
                return Err(err);
            }
            if self.ctx.breakers.is_open(&source_id) {
                debug!(source = %source_id, attempt, "Breaker opened, leaving primary tier");
                return Err(err);
            }

            let delay = self.retry.delay_after(attempt);
            if let FetchError::RateLimited {
                retry_after: Some(wait),
            } = &err
            {
                if *wait > delay {
                    debug!(metric = %metric, retry_after_ms = wait.as_millis() as u64, "Provider asked for a longer pause");
                    return Err(err);
                }
            }
            last_error = err;

            debug!(metric = %metric, delay_ms = delay.as_millis() as u64, "Backing off before retry");
            sleep(delay).await;
        }

        Err(last_error)
    }

    async fn fetch_backup(
        &self,
        metric: &MetricId,
        source: &dyn MetricSource,
    ) -> std::result::Result<f64, FetchError> {
        let source_id = SourceId::backup(metric);
        if !self.ctx.breakers.is_available(&source_id) {
            return Err(FetchError::CircuitOpen {
                source_id: source_id.to_string(),
            });
        }

        let admission = source.admit(SourceTier::Backup).await?;
        let started = Instant::now();
        let outcome = bounded(source.fetch_backup(), self.retry.backup_timeout).await;
        let latency = started.elapsed();
        drop(admission);

        match outcome {
            Ok(value) => {
                self.ctx.breakers.report_success(&source_id);
                self.ctx
                    .audit
                    .record(&FetchAttempt::succeeded(metric, SourceTier::Backup, latency));
                Ok(value)
            }
            Err(err) => {
                self.ctx.audit.record(&FetchAttempt::failed(
                    metric,
                    SourceTier::Backup,
                    latency,
                    err.clone(),
                ));
                self.charge(&source_id, &err);
                Err(err)
            }
        }
    }

    fn charge(&self, source_id: &SourceId, err: &FetchError) {
        match err {
            FetchError::RateLimited { .. } => self.ctx.breakers.report_rate_limited(source_id),
            _ => self.ctx.breakers.report_failure(source_id),
        }
    }

    /// Write a served value to the cache, and primary values to history.
    fn remember(&self, key: &CacheKey, data: &MetricData, spec: &MetricSpec) {
        if let Err(e) = self.ctx.cache.set(key, data, spec.ttl) {
            warn!(metric = %spec.id, error = %e, "Cache write failed");
        }
        if data.tier() == SourceTier::Primary {
            let bucket = self.bucket.start_of(data.timestamp());
            if let Err(e) = self.ctx.history.record(data, bucket) {
                warn!(metric = %spec.id, error = %e, "History write failed");
            }
        }
    }
}

/// Run one provider call under a hard timeout, rejecting non-finite values.
async fn bounded<F>(call: F, limit: Duration) -> std::result::Result<f64, FetchError>
where
    F: Future<Output = std::result::Result<f64, FetchError>>,
{
    match timeout(limit, call).await {
        Ok(Ok(value)) if value.is_finite() => Ok(value),
        Ok(Ok(value)) => Err(FetchError::Parse(format!("non-finite value {value}"))),
        Ok(Err(e)) => Err(e),
        Err(_) => Err(FetchError::Timeout { elapsed: limit }),
    }
}
