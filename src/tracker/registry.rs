//! Registry of live workers, one per coin

use super::worker::Worker;
use super::{TrackerError, WorkerState};
use crate::source::PriceSource;
use crate::store::SampleStore;
use crate::telemetry::{set_gauge, GaugeMetric};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Handle to a launched worker, owned by its registry entry
struct WorkerHandle {
    cancel: CancellationToken,
    task: JoinHandle<WorkerState>,
}

/// Single authority over which coins have a live worker
///
/// Every read and write of the map goes through one mutex, so two
/// concurrent starts for the same coin cannot both succeed.
pub struct Registry {
    workers: Mutex<HashMap<String, WorkerHandle>>,
    source: Arc<dyn PriceSource>,
    store: Arc<dyn SampleStore>,
    poll_interval: Duration,
}

impl Registry {
    /// Create an empty registry
    pub fn new(
        source: Arc<dyn PriceSource>,
        store: Arc<dyn SampleStore>,
        poll_interval: Duration,
    ) -> Self {
        Self {
            workers: Mutex::new(HashMap::new()),
            source,
            store,
            poll_interval,
        }
    }

    /// Launch a worker for `subject`
    ///
    /// Returns as soon as the worker is spawned; the first poll happens one
    /// interval later.
    pub async fn start(&self, subject: &str) -> Result<(), TrackerError> {
        let mut workers = self.workers.lock().await;

        if workers.contains_key(subject) {
            return Err(TrackerError::AlreadyTracked(subject.to_string()));
        }

        let cancel = CancellationToken::new();
        let worker = Worker::new(
            subject,
            self.source.clone(),
            self.store.clone(),
            self.poll_interval,
            cancel.clone(),
        );
        let task = tokio::spawn(worker.run());

        workers.insert(subject.to_string(), WorkerHandle { cancel, task });
        set_gauge(GaugeMetric::TrackedSubjects, workers.len() as f64);

        tracing::info!(coin = subject, "Tracking started");
        Ok(())
    }

    /// Signal the worker for `subject` and forget it
    ///
    /// Does not wait for the loop to exit: a tick already in flight may still
    /// store one more sample after this returns.
    pub async fn stop(&self, subject: &str) -> Result<(), TrackerError> {
        let mut workers = self.workers.lock().await;

        let handle = workers
            .remove(subject)
            .ok_or_else(|| TrackerError::NotTracked(subject.to_string()))?;
        handle.cancel.cancel();
        set_gauge(GaugeMetric::TrackedSubjects, workers.len() as f64);

        tracing::info!(coin = subject, "Tracking stopped");
        Ok(())
    }

    /// Whether a worker is registered for `subject`
    pub async fn contains(&self, subject: &str) -> bool {
        self.workers.lock().await.contains_key(subject)
    }

    /// Lifecycle state of the worker registered for `subject`
    ///
    /// `Stopped` here means the loop exited without a stop request, which
    /// only happens if the task panicked.
    pub async fn state(&self, subject: &str) -> Option<WorkerState> {
        let workers = self.workers.lock().await;
        workers.get(subject).map(|handle| {
            if handle.task.is_finished() {
                WorkerState::Stopped
            } else {
                WorkerState::Running
            }
        })
    }

    /// Registered coins, sorted
    pub async fn subjects(&self) -> Vec<String> {
        let workers = self.workers.lock().await;
        let mut subjects: Vec<String> = workers.keys().cloned().collect();
        subjects.sort();
        subjects
    }

    /// Number of registered workers
    pub async fn len(&self) -> usize {
        self.workers.lock().await.len()
    }

    /// Whether no worker is registered
    pub async fn is_empty(&self) -> bool {
        self.workers.lock().await.is_empty()
    }

    /// Cancel every worker and wait for all loops to exit
    pub async fn shutdown(&self) {
        let drained: Vec<(String, WorkerHandle)> = {
            let mut workers = self.workers.lock().await;
            workers.drain().collect()
        };
        set_gauge(GaugeMetric::TrackedSubjects, 0.0);

        for (_, handle) in &drained {
            handle.cancel.cancel();
        }

        let count = drained.len();
        for (subject, handle) in drained {
            if let Err(e) = handle.task.await {
                tracing::error!(coin = %subject, error = %e, "Worker task failed");
            }
        }

        tracing::info!(workers = count, "All workers stopped");
    }
}
