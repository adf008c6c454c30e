use std::sync::Arc;
use std::time::Duration;

use regimewatch::adapter::outbound::memory::{MemoryCacheStore, MemoryHistoryStore};
use regimewatch::application::{
    CircuitBreaker, FetchContext, FetchOrchestrator, HealthTracker, MetricBinding, RegimeEngine,
};
use regimewatch::domain::{AggregatePolicy, MetricId, MetricSpec, Scorer};
use regimewatch::port::outbound::HistoryBucket;
use regimewatch::testkit::{config, source::ScriptedSource};

/// In-memory engine with fast retries and shared handles for assertions.
pub struct TestEngine {
    pub breakers: Arc<CircuitBreaker>,
    pub cache: Arc<MemoryCacheStore>,
    pub history: Arc<MemoryHistoryStore>,
    pub health: Arc<HealthTracker>,
    pub orchestrator: Arc<FetchOrchestrator>,
}

impl TestEngine {
    pub fn new() -> Self {
        let breakers = Arc::new(CircuitBreaker::new(config::breaker()));
        let cache = Arc::new(MemoryCacheStore::new());
        let history = Arc::new(MemoryHistoryStore::new());
        let health = Arc::new(HealthTracker::new());
        let ctx = FetchContext::new(
            breakers.clone(),
            cache.clone(),
            history.clone(),
            health.clone(),
        );
        let orchestrator = Arc::new(FetchOrchestrator::new(
            ctx,
            config::retry(),
            HistoryBucket::default(),
        ));
        Self {
            breakers,
            cache,
            history,
            health,
            orchestrator,
        }
    }

    pub fn engine(&self, metrics: Vec<MetricBinding>) -> RegimeEngine {
        RegimeEngine::new(
            self.orchestrator.clone(),
            metrics,
            AggregatePolicy::default(),
            Duration::from_secs(30),
        )
    }
}

/// Bind a scripted source to a threshold metric.
pub fn threshold(id: &str, weight: f64, bull: f64, bear: f64, source: ScriptedSource) -> MetricBinding {
    MetricBinding::new(
        MetricSpec::new(MetricId::new(id), weight, Scorer::threshold(bull, bear, false)),
        Arc::new(source),
    )
}
