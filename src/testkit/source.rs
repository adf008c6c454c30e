//! Scripted [`MetricSource`] for orchestrator and engine tests.
//!
//! Each tier pops the next scripted [`Outcome`] per call and falls back to a
//! default once its queue is exhausted. Call counters are shared through
//! `Arc`, so clones of a source report the same totals. An optional gate
//! stands in for a shared connection pool: admission waits for one of its
//! permits.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::error::FetchError;
use crate::domain::SourceTier;
use crate::port::outbound::{Admission, MetricSource};

/// How long a hanging call sleeps before giving up on its own.
const HANG: Duration = Duration::from_secs(24 * 60 * 60);

/// Result of one scripted call.
#[derive(Debug, Clone)]
pub enum Outcome {
    /// Return this value.
    Value(f64),
    /// Return this error.
    Fail(FetchError),
    /// Never answer within any realistic timeout.
    Hang,
}

impl Outcome {
    async fn play(self) -> Result<f64, FetchError> {
        match self {
            Self::Value(v) => Ok(v),
            Self::Fail(e) => Err(e),
            Self::Hang => {
                tokio::time::sleep(HANG).await;
                Err(FetchError::Timeout { elapsed: HANG })
            }
        }
    }
}

#[derive(Debug)]
struct Tier {
    queue: Mutex<VecDeque<Outcome>>,
    fallback: Mutex<Outcome>,
    calls: Arc<AtomicU32>,
}

impl Tier {
    fn new() -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            fallback: Mutex::new(Outcome::Fail(FetchError::Network("unscripted".into()))),
            calls: Arc::new(AtomicU32::new(0)),
        }
    }

    fn next(&self) -> Outcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let scripted = self.queue.lock().pop_front();
        scripted.unwrap_or_else(|| self.fallback.lock().clone())
    }
}

/// A metric source whose answers are fixed ahead of time.
#[derive(Debug)]
pub struct ScriptedSource {
    primary: Tier,
    backup: Tier,
    gate: Option<Arc<Semaphore>>,
}

impl ScriptedSource {
    /// A source whose every call fails with a network error.
    pub fn new() -> Self {
        Self {
            primary: Tier::new(),
            backup: Tier::new(),
            gate: None,
        }
    }

    /// Admit calls only while holding a permit from `gate`.
    pub fn gated(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Queue outcomes for successive primary calls.
    pub fn primary(self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.primary.queue.lock().extend(outcomes);
        self
    }

    /// Outcome for primary calls once the queue is empty.
    pub fn primary_always(self, outcome: Outcome) -> Self {
        *self.primary.fallback.lock() = outcome;
        self
    }

    /// Queue outcomes for successive backup calls.
    pub fn backup(self, outcomes: impl IntoIterator<Item = Outcome>) -> Self {
        self.backup.queue.lock().extend(outcomes);
        self
    }

    /// Outcome for backup calls once the queue is empty.
    pub fn backup_always(self, outcome: Outcome) -> Self {
        *self.backup.fallback.lock() = outcome;
        self
    }

    pub fn primary_calls(&self) -> u32 {
        self.primary.calls.load(Ordering::SeqCst)
    }

    pub fn backup_calls(&self) -> u32 {
        self.backup.calls.load(Ordering::SeqCst)
    }

    /// Shared counters as `(primary, backup)`, readable after the source
    /// has been moved into an `Arc<dyn MetricSource>`.
    pub fn counters(&self) -> (Arc<AtomicU32>, Arc<AtomicU32>) {
        (self.primary.calls.clone(), self.backup.calls.clone())
    }
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricSource for ScriptedSource {
    fn providers(&self) -> (&str, &str) {
        ("scripted-primary", "scripted-backup")
    }

    async fn admit(&self, _tier: SourceTier) -> Result<Admission, FetchError> {
        match &self.gate {
            Some(gate) => {
                let permit = Arc::clone(gate)
                    .acquire_owned()
                    .await
                    .map_err(|e| FetchError::Network(e.to_string()))?;
                Ok(Admission::holding(permit))
            }
            None => Ok(Admission::immediate()),
        }
    }

    async fn fetch_primary(&self) -> Result<f64, FetchError> {
        self.primary.next().play().await
    }

    async fn fetch_backup(&self) -> Result<f64, FetchError> {
        self.backup.next().play().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn queue_then_fallback() {
        let source = ScriptedSource::new()
            .primary([Outcome::Value(1.0), Outcome::Value(2.0)])
            .primary_always(Outcome::Value(9.0));

        assert_eq!(source.fetch_primary().await, Ok(1.0));
        assert_eq!(source.fetch_primary().await, Ok(2.0));
        assert_eq!(source.fetch_primary().await, Ok(9.0));
        assert_eq!(source.primary_calls(), 3);
        assert_eq!(source.backup_calls(), 0);
    }

    #[tokio::test]
    async fn unscripted_calls_fail() {
        let source = ScriptedSource::new();
        assert!(matches!(
            source.fetch_backup().await,
            Err(FetchError::Network(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn gate_blocks_admission_until_a_permit_frees() {
        let gate = Arc::new(Semaphore::new(1));
        let source = ScriptedSource::new().gated(gate.clone());

        let held = gate.clone().acquire_owned().await.unwrap();
        let waiting =
            tokio::time::timeout(Duration::from_secs(1), source.admit(SourceTier::Primary)).await;
        assert!(waiting.is_err());

        drop(held);
        let admission = source.admit(SourceTier::Primary).await.unwrap();
        assert!(admission.is_held());
        assert_eq!(gate.available_permits(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn hang_outlasts_attempt_timeouts() {
        let source = ScriptedSource::new().primary_always(Outcome::Hang);
        let result =
            tokio::time::timeout(Duration::from_secs(60), source.fetch_primary()).await;
        assert!(result.is_err());
    }
}
