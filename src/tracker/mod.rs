//! Tracker module
//!
//! Starts and stops per-coin polling workers and answers price queries.
//! Start and stop go through the [`Registry`]; price queries go straight to
//! the sample store and work whether or not the coin is still tracked.

mod registry;
mod types;
mod worker;

pub use registry::Registry;
pub use types::{TickOutcome, TrackerError, WorkerState};
pub use worker::Worker;

use crate::source::PriceSource;
use crate::store::{Sample, SampleStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Entry point for the three tracking operations
pub struct Tracker {
    registry: Registry,
    store: Arc<dyn SampleStore>,
}

impl Tracker {
    /// Create a tracker with an empty registry
    pub fn new(
        source: Arc<dyn PriceSource>,
        store: Arc<dyn SampleStore>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            registry: Registry::new(source, store.clone(), poll_interval),
            store,
        }
    }

    /// Begin polling a coin
    pub async fn start_tracking(&self, subject: &str) -> Result<(), TrackerError> {
        self.registry.start(subject).await
    }

    /// Stop polling a coin
    pub async fn stop_tracking(&self, subject: &str) -> Result<(), TrackerError> {
        self.registry.stop(subject).await
    }

    /// Stored sample closest to `at`
    pub async fn query_price(
        &self,
        subject: &str,
        at: DateTime<Utc>,
    ) -> Result<Sample, TrackerError> {
        Ok(self.store.nearest_sample(subject, at).await?)
    }

    /// Whether a coin currently has a worker
    pub async fn is_tracked(&self, subject: &str) -> bool {
        self.registry.contains(subject).await
    }

    /// Worker state for a tracked coin, `None` when untracked
    pub async fn worker_state(&self, subject: &str) -> Option<WorkerState> {
        self.registry.state(subject).await
    }

    /// Currently tracked coins, sorted
    pub async fn tracked(&self) -> Vec<String> {
        self.registry.subjects().await
    }

    /// Stop every worker and wait for them to exit
    pub async fn shutdown(&self) {
        self.registry.shutdown().await;
    }
}
