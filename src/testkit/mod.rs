//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`source`] : [`ScriptedSource`](source::ScriptedSource), a
//!   [`MetricSource`](crate::port::outbound::MetricSource) with queued outcomes per tier.
//! - [`config`] : Canonical test configurations (fast retries, mock provider URLs).

pub mod config;
pub mod source;
