//! Application services (use cases).
//!
//! These services coordinate the domain logic with the outbound ports:
//! breaker bookkeeping, tiered retrieval, the aggregation cycle, history
//! replay and health tracking.

pub mod breaker;
pub mod cycle;
pub mod fetch;
pub mod health;
pub mod history;

pub use breaker::{BreakerPolicy, BreakerSnapshot, BreakerState, CircuitBreaker};
pub use cycle::{MetricBinding, RegimeEngine};
pub use fetch::{FetchContext, FetchOrchestrator, RetryPolicy, MAX_ATTEMPT_TIMEOUT};
pub use health::{FanoutAudit, HealthTracker};
pub use history::HistoryReplay;
