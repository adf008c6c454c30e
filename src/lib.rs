//! regimewatch - resilient multi-source market regime aggregation.
//!
//! Eight market metrics are fetched concurrently, each from a primary
//! provider with a structurally different backup. Every metric is scored
//! against its own rule and the weighted scores are summed into a
//! `BULL` / `BEAR` / `NEUTRAL` regime with a confidence grade.
//!
//! # Architecture
//!
//! - **`domain`** - Pure scoring and aggregation: [`domain::Scorer`],
//!   [`domain::aggregate`], [`domain::Snapshot`]
//! - **`port`** - Capabilities the engine needs: metric sources, cache,
//!   history rows, audit sink
//! - **`application`** - Circuit breaker, fetch orchestration with tiered
//!   fallback, the concurrent cycle, health tracking, history replay
//! - **`adapter`** - HTTP provider adapters, SQLite and in-memory stores,
//!   the CLI
//! - **`infrastructure`** - Configuration and the composition root
//!
//! # Fallback ladder
//!
//! For every metric: fresh cache, then the primary provider with retries,
//! then one backup attempt, then a neutral zero score with `LOW`
//! confidence. A single metric's failure never fails the cycle.
//!
//! # Example
//!
//! ```no_run
//! use regimewatch::infrastructure::bootstrap::Runtime;
//! use regimewatch::infrastructure::config::Config;
//!
//! # async fn run() -> regimewatch::error::Result<()> {
//! let config = Config::load("config.toml")?;
//! let runtime = Runtime::build(&config)?;
//! let snapshot = runtime.snapshot().await?;
//! println!("{} {:+.2}", snapshot.label, snapshot.total_score);
//! runtime.shutdown()?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
