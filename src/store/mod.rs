//! Sample storage module
//!
//! Append-only log of price samples with nearest-timestamp lookup

mod memory;
mod postgres;

pub use memory::InMemorySampleStore;
pub use postgres::PgSampleStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// One persisted price observation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Unique record identifier
    pub id: Uuid,
    /// Coin identifier
    pub subject: String,
    /// Captured price
    pub value: Decimal,
    /// Capture time
    pub timestamp: DateTime<Utc>,
}

impl Sample {
    /// Create a sample with a fresh identifier
    pub fn new(subject: impl Into<String>, value: Decimal, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            value,
            timestamp,
        }
    }
}

/// Storage errors
#[derive(Debug, Error)]
pub enum StoreError {
    /// No samples exist for the subject
    #[error("No samples stored for '{0}'")]
    NotFound(String),
    /// Backend unavailable or query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Trait for sample store implementations
#[async_trait]
pub trait SampleStore: Send + Sync {
    /// Append one sample
    async fn append_sample(
        &self,
        subject: &str,
        value: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Sample whose timestamp is closest to `target`
    ///
    /// On equal distance the later sample wins.
    async fn nearest_sample(
        &self,
        subject: &str,
        target: DateTime<Utc>,
    ) -> Result<Sample, StoreError>;
}
