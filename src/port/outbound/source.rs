//! Metric provider port.

use std::fmt;

use async_trait::async_trait;

use crate::domain::SourceTier;
use crate::error::FetchError;

/// Clearance to send one provider request.
///
/// Returned by [`MetricSource::admit`] and held while the request runs;
/// dropping it frees the slot for the next caller. Time spent waiting for
/// admission is not part of the attempt and never counts against a source.
pub struct Admission(Option<Box<dyn Send + Sync>>);

impl Admission {
    /// Admission that holds nothing.
    #[must_use]
    pub fn immediate() -> Self {
        Self(None)
    }

    /// Admission that keeps `guard` alive until dropped.
    #[must_use]
    pub fn holding<G: Send + Sync + 'static>(guard: G) -> Self {
        Self(Some(Box::new(guard)))
    }

    /// True when a slot is held.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.0.is_some()
    }
}

impl fmt::Debug for Admission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Admission")
            .field("held", &self.is_held())
            .finish()
    }
}

/// Retrieval capability for one metric.
///
/// Each metric kind has one implementation that knows its primary provider
/// and a structurally different backup provider. Payload parsing and schema
/// validation are the implementation's responsibility; the orchestrator only
/// sees a number or a classified [`FetchError`].
#[async_trait]
pub trait MetricSource: Send + Sync {
    /// Human-readable provider names for logs, as `(primary, backup)`.
    fn providers(&self) -> (&str, &str);

    /// Wait for clearance to call the provider of `tier`.
    ///
    /// Shared admission control (connection limits, per-host spacing) lives
    /// here so the orchestrator can start the attempt timeout only once the
    /// request is actually allowed out.
    async fn admit(&self, _tier: SourceTier) -> Result<Admission, FetchError> {
        Ok(Admission::immediate())
    }

    /// Retrieve the current value from the primary provider.
    async fn fetch_primary(&self) -> Result<f64, FetchError>;

    /// Retrieve the current value from the backup provider.
    async fn fetch_backup(&self) -> Result<f64, FetchError>;
}
