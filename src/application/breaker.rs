//! Per-source circuit breakers.
//!
//! # States
//! - Closed: normal operation, calls pass through
//! - Open: source assumed down, calls are refused until the cooldown elapses
//! - Half-Open: one trial call is admitted
//!
//! # State Transitions
//! ```text
//! Closed → Open: consecutive failures >= threshold
//! Open → Half-Open: availability check after the cooldown
//! Half-Open → Closed: trial call succeeds
//! Half-Open → Open: trial call fails (cooldown restarts)
//! ```
//!
//! State lives for the whole process and is only reset by successful calls.
//! Entries are keyed by [`SourceId`] in a sharded map, so different sources
//! never contend on a shared lock.

use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::{debug, error, info};

use crate::domain::SourceId;

/// Breaker thresholds shared by every source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerPolicy {
    /// Consecutive failures that open the breaker.
    pub failure_threshold: u32,
    /// How long an open breaker refuses calls.
    pub cooldown: Duration,
    /// Failures charged for a single rate-limit response.
    pub rate_limit_penalty: u32,
}

impl Default for BreakerPolicy {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            cooldown: Duration::from_secs(300),
            rate_limit_penalty: 2,
        }
    }
}

/// Circuit breaker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

impl BreakerState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Closed => "CLOSED",
            Self::Open => "OPEN",
            Self::HalfOpen => "HALF_OPEN",
        }
    }
}

/// Point-in-time view of one breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BreakerSnapshot {
    pub state: BreakerState,
    pub consecutive_failures: u32,
    pub opened_at: Option<Instant>,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    state: BreakerState,
    failures: u32,
    opened_at: Option<Instant>,
    /// When the outstanding half-open trial was admitted.
    trial_started: Option<Instant>,
}

impl Default for Entry {
    fn default() -> Self {
        Self {
            state: BreakerState::Closed,
            failures: 0,
            opened_at: None,
            trial_started: None,
        }
    }
}

/// Registry of breakers, one per source.
#[derive(Debug)]
pub struct CircuitBreaker {
    policy: BreakerPolicy,
    entries: DashMap<SourceId, Entry>,
}

impl CircuitBreaker {
    #[must_use]
    pub fn new(policy: BreakerPolicy) -> Self {
        Self {
            policy,
            entries: DashMap::new(),
        }
    }

    #[must_use]
    pub fn policy(&self) -> BreakerPolicy {
        self.policy
    }

    /// Whether a call to `source` may proceed.
    ///
    /// An open breaker whose cooldown has elapsed moves to half-open and
    /// admits this one call. Further checks return false until the trial
    /// reports back, or until another cooldown passes without a report.
    pub fn is_available(&self, source: &SourceId) -> bool {
        let Some(mut entry) = self.entries.get_mut(source) else {
            return true;
        };
        let now = Instant::now();

        match entry.state {
            BreakerState::Closed => true,
            BreakerState::Open => {
                let opened = entry.opened_at.unwrap_or(now);
                if now.saturating_duration_since(opened) >= self.policy.cooldown {
                    entry.state = BreakerState::HalfOpen;
                    entry.trial_started = Some(now);
                    info!(source = %source, "Circuit breaker half-open, admitting trial call");
                    true
                } else {
                    false
                }
            }
            BreakerState::HalfOpen => match entry.trial_started {
                // The previous trial never reported back.
                Some(started)
                    if now.saturating_duration_since(started) >= self.policy.cooldown =>
                {
                    entry.trial_started = Some(now);
                    debug!(source = %source, "Re-admitting stale half-open trial");
                    true
                }
                _ => false,
            },
        }
    }

    /// Record a successful call: closes the breaker and clears the count.
    pub fn report_success(&self, source: &SourceId) {
        let mut entry = self.entries.entry(source.clone()).or_default();
        if entry.state != BreakerState::Closed {
            info!(source = %source, "Circuit breaker closed");
        }
        *entry = Entry::default();
    }

    /// Record a failed call.
    pub fn report_failure(&self, source: &SourceId) {
        self.charge(source, 1);
    }

    /// Record a rate-limit response, which counts as several failures.
    pub fn report_rate_limited(&self, source: &SourceId) {
        self.charge(source, self.policy.rate_limit_penalty.max(1));
    }

    fn charge(&self, source: &SourceId, failures: u32) {
        let now = Instant::now();
        let mut entry = self.entries.entry(source.clone()).or_default();
        entry.failures = entry.failures.saturating_add(failures);

        let trip = entry.state == BreakerState::HalfOpen
            || entry.failures >= self.policy.failure_threshold;
        if !trip {
            debug!(source = %source, failures = entry.failures, "Source failure recorded");
            return;
        }

        if entry.state != BreakerState::Open {
            error!(
                source = %source,
                failures = entry.failures,
                cooldown_secs = self.policy.cooldown.as_secs(),
                "Circuit breaker opened"
            );
        }
        entry.state = BreakerState::Open;
        entry.opened_at = Some(now);
        entry.trial_started = None;
    }

    /// True while `source` is open. Unlike [`CircuitBreaker::is_available`]
    /// this never starts a half-open trial.
    #[must_use]
    pub fn is_open(&self, source: &SourceId) -> bool {
        self.entries
            .get(source)
            .is_some_and(|entry| entry.state == BreakerState::Open)
    }

    /// Current state of `source`; unknown sources read as closed.
    #[must_use]
    pub fn snapshot(&self, source: &SourceId) -> BreakerSnapshot {
        let entry = self.entries.get(source).map(|e| *e).unwrap_or_default();
        BreakerSnapshot {
            state: entry.state,
            consecutive_failures: entry.failures,
            opened_at: entry.opened_at,
        }
    }

    /// Snapshots of every source seen so far.
    #[must_use]
    pub fn snapshots(&self) -> Vec<(SourceId, BreakerSnapshot)> {
        let mut all: Vec<_> = self
            .entries
            .iter()
            .map(|e| {
                (
                    e.key().clone(),
                    BreakerSnapshot {
                        state: e.state,
                        consecutive_failures: e.failures,
                        opened_at: e.opened_at,
                    },
                )
            })
            .collect();
        all.sort_by(|a, b| a.0.to_string().cmp(&b.0.to_string()));
        all
    }
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new(BreakerPolicy::default())
    }
}
