//! Port definitions (hexagonal architecture).
//!
//! Inbound ports are the use-cases the application offers to drivers such
//! as the CLI. Outbound ports are the capabilities the application needs
//! from the outside world: metric providers, the cache, the history row
//! store and an audit sink. Adapters in [`crate::adapter`] implement them.

pub mod inbound;
pub mod outbound;
