//! Shared outbound request governor.
//!
//! Every provider call takes a permit from a process-wide semaphore, which
//! bounds concurrent connections. Calls to the same host are additionally
//! spaced by a minimum interval, which serialises them across metrics.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};
use tokio::time::{sleep_until, Instant};
use tracing::trace;

use crate::error::FetchError;

/// Admission control for outbound provider requests.
#[derive(Debug)]
pub struct ProviderGovernor {
    permits: Arc<Semaphore>,
    spacing: Duration,
    /// Time of the last admitted request per host.
    hosts: DashMap<String, Arc<Mutex<Option<Instant>>>>,
}

/// Held for the duration of one request.
#[derive(Debug)]
pub struct GovernorPermit {
    _permit: OwnedSemaphorePermit,
}

impl ProviderGovernor {
    #[must_use]
    pub fn new(max_connections: usize, spacing: Duration) -> Self {
        Self {
            permits: Arc::new(Semaphore::new(max_connections.max(1))),
            spacing,
            hosts: DashMap::new(),
        }
    }

    /// Permits not currently held.
    #[must_use]
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Wait until a request to `host` may be sent.
    pub async fn acquire(&self, host: &str) -> Result<GovernorPermit, FetchError> {
        let slot = Arc::clone(&self.hosts.entry(host.to_string()).or_default());
        let mut last = slot.lock().await;

        if let Some(previous) = *last {
            let ready = previous + self.spacing;
            if ready > Instant::now() {
                trace!(host, wait_ms = (ready - Instant::now()).as_millis() as u64, "Spacing request");
                sleep_until(ready).await;
            }
        }

        let permit = Arc::clone(&self.permits)
            .acquire_owned()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        *last = Some(Instant::now());
        Ok(GovernorPermit { _permit: permit })
    }
}
