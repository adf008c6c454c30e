//! Outbound ports used by the fetch orchestrator and the regime engine.

pub mod audit;
pub mod cache;
pub mod history;
pub mod source;

pub use audit::{AuditSink, FetchAttempt, MetricStatus};
pub use cache::CacheStore;
pub use history::{HistoryBucket, HistoryRow, HistoryStore};
pub use source::{Admission, MetricSource};
