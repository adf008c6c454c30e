//! Infrastructure configuration modules.

pub mod fetch;
pub mod logging;
pub mod metrics;
pub mod settings;

pub use settings::Config;
