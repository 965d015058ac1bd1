//! Per-coin polling worker

use super::{TickOutcome, WorkerState};
use crate::source::PriceSource;
use crate::store::SampleStore;
use crate::telemetry::{increment_counter, CounterMetric};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Polls one coin on a fixed interval until cancelled
pub struct Worker {
    subject: String,
    source: Arc<dyn PriceSource>,
    store: Arc<dyn SampleStore>,
    interval: Duration,
    cancel: CancellationToken,
}

impl Worker {
    /// Create a worker; nothing runs until [`Worker::run`] is polled
    pub fn new(
        subject: impl Into<String>,
        source: Arc<dyn PriceSource>,
        store: Arc<dyn SampleStore>,
        interval: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            subject: subject.into(),
            source,
            store,
            interval,
            cancel,
        }
    }

    /// Run the polling loop
    ///
    /// The first tick fires one interval after launch. Cancellation is only
    /// observed between ticks; a tick in progress always runs to completion.
    pub async fn run(self) -> WorkerState {
        let mut ticker = interval_at(first_tick(self.interval), self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            coin = %self.subject,
            interval_secs = self.interval.as_secs(),
            "Worker started"
        );

        loop {
            tokio::select! {
                biased;

                _ = self.cancel.cancelled() => break,
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
            }
        }

        tracing::info!(coin = %self.subject, "Worker stopped");
        WorkerState::Stopped
    }

    /// Fetch one price and persist it
    pub async fn poll_once(&self) -> TickOutcome {
        let value = match self.source.fetch_value(&self.subject).await {
            Ok(value) => value,
            Err(e) => {
                increment_counter(CounterMetric::FetchFailures, &self.subject);
                tracing::warn!(coin = %self.subject, error = %e, "Failed to fetch price");
                return TickOutcome::FetchFailed;
            }
        };

        if let Err(e) = self
            .store
            .append_sample(&self.subject, value, Utc::now())
            .await
        {
            increment_counter(CounterMetric::PersistFailures, &self.subject);
            tracing::error!(coin = %self.subject, error = %e, "Failed to save price");
            return TickOutcome::PersistFailed;
        }

        increment_counter(CounterMetric::SamplesRecorded, &self.subject);
        tracing::info!(coin = %self.subject, price = %value, "Price recorded");
        TickOutcome::Recorded(value)
    }
}

/// One interval from now, or a far-future deadline when that overflows
fn first_tick(interval: Duration) -> Instant {
    let now = Instant::now();
    now.checked_add(interval)
        .unwrap_or_else(|| now + Duration::from_secs(86_400 * 365 * 30))
}
