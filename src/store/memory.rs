//! In-memory sample store

use super::{Sample, SampleStore, StoreError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Sample store kept in process memory
///
/// Samples for each subject are kept sorted by timestamp so nearest
/// lookups are a binary search.
#[derive(Clone, Default)]
pub struct InMemorySampleStore {
    samples: Arc<RwLock<HashMap<String, Vec<Sample>>>>,
}

impl InMemorySampleStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a prebuilt sample
    pub async fn insert(&self, sample: Sample) {
        let mut samples = self.samples.write().await;
        let series = samples.entry(sample.subject.clone()).or_default();
        // Equal timestamps keep insertion order
        let pos = series.partition_point(|s| s.timestamp <= sample.timestamp);
        series.insert(pos, sample);
    }

    /// All samples for a subject, oldest first
    pub async fn samples(&self, subject: &str) -> Vec<Sample> {
        let samples = self.samples.read().await;
        samples.get(subject).cloned().unwrap_or_default()
    }

    /// Number of samples stored for a subject
    pub async fn count(&self, subject: &str) -> usize {
        let samples = self.samples.read().await;
        samples.get(subject).map_or(0, Vec::len)
    }
}

/// Pick the sample closest to `target` from a timestamp-sorted slice
fn nearest(series: &[Sample], target: DateTime<Utc>) -> Option<&Sample> {
    let idx = series.partition_point(|s| s.timestamp < target);
    let after = series.get(idx);
    let before = idx.checked_sub(1).and_then(|i| series.get(i));

    match (before, after) {
        (Some(b), Some(a)) => {
            let before_dist = target - b.timestamp;
            let after_dist = a.timestamp - target;
            if after_dist <= before_dist {
                Some(a)
            } else {
                // First sample of the run sharing the closest earlier timestamp
                let start = series.partition_point(|s| s.timestamp < b.timestamp);
                series.get(start)
            }
        }
        (Some(b), None) => {
            let start = series.partition_point(|s| s.timestamp < b.timestamp);
            series.get(start)
        }
        (None, after) => after,
    }
}

#[async_trait]
impl SampleStore for InMemorySampleStore {
    async fn append_sample(
        &self,
        subject: &str,
        value: Decimal,
        timestamp: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.insert(Sample::new(subject, value, timestamp)).await;
        Ok(())
    }

    async fn nearest_sample(
        &self,
        subject: &str,
        target: DateTime<Utc>,
    ) -> Result<Sample, StoreError> {
        let samples = self.samples.read().await;
        samples
            .get(subject)
            .and_then(|series| nearest(series, target))
            .cloned()
            .ok_or_else(|| StoreError::NotFound(subject.to_string()))
    }
}
