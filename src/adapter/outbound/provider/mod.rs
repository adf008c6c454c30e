//! HTTP provider adapters for the eight regime metrics.
//!
//! Every metric has a primary and a structurally different backup provider.
//! All requests share one [`HttpClient`] and therefore one
//! [`ProviderGovernor`].

pub mod extract;
pub mod governor;
pub mod http;
pub mod payload;
pub mod source;

pub use governor::{GovernorPermit, ProviderGovernor};
pub use http::HttpClient;
pub use source::{build_source, HttpMetricSource};
