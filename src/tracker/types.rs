//! Tracker types

use crate::store::StoreError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors surfaced by the tracker operations
#[derive(Debug, Error)]
pub enum TrackerError {
    /// A worker already runs for this coin
    #[error("Coin '{0}' is already tracked")]
    AlreadyTracked(String),
    /// No worker runs for this coin
    #[error("Coin '{0}' is not tracked")]
    NotTracked(String),
    /// No stored samples for this coin
    #[error("No price stored for '{0}'")]
    NotFound(String),
    /// Storage failure while answering a query
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for TrackerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(subject) => Self::NotFound(subject),
            other => Self::Store(other),
        }
    }
}

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Loop is ticking
    Running,
    /// Cancellation observed, loop exited
    Stopped,
}

/// Result of a single tick
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Price fetched and stored
    Recorded(Decimal),
    /// Fetch failed, nothing stored
    FetchFailed,
    /// Fetch succeeded but the insert failed; value dropped
    PersistFailed,
}
