//! SQLite persistence adapters.
//!
//! Provides SQLite-backed implementations of the cache, the history row
//! store and the fetch audit log using Diesel ORM.

pub mod audit;
pub mod cache;
pub mod database;
pub mod history;

pub use audit::SqliteAuditLog;
pub use cache::SqliteCacheStore;
pub use database::connection::{create_pool, run_migrations, DbPool};
pub use history::SqliteHistoryStore;
