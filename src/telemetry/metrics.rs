//! Prometheus metrics

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Duration;

/// Latency metric types
#[derive(Debug, Clone, Copy)]
pub enum LatencyMetric {
    /// Upstream price request round-trip
    PriceFetch,
}

/// Per-coin counter metric types
#[derive(Debug, Clone, Copy)]
pub enum CounterMetric {
    /// Samples persisted
    SamplesRecorded,
    /// Ticks abandoned because the fetch failed
    FetchFailures,
    /// Ticks abandoned because the insert failed
    PersistFailures,
}

/// Gauge metric types
#[derive(Debug, Clone, Copy)]
pub enum GaugeMetric {
    /// Coins with a live worker
    TrackedSubjects,
}

/// Start the Prometheus scrape endpoint on `0.0.0.0:port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;

    tracing::info!(%addr, "Prometheus metrics exporter listening");
    Ok(())
}

/// Record a latency measurement
pub fn record_latency(metric: LatencyMetric, duration: Duration) {
    let metric_name = match metric {
        LatencyMetric::PriceFetch => "coin_tracker_fetch_latency_ms",
    };

    histogram!(metric_name).record(duration.as_secs_f64() * 1000.0);
}

impl CounterMetric {
    fn name(self) -> &'static str {
        match self {
            Self::SamplesRecorded => "coin_tracker_samples_recorded_total",
            Self::FetchFailures => "coin_tracker_fetch_failures_total",
            Self::PersistFailures => "coin_tracker_persist_failures_total",
        }
    }

    /// Whether the counter carries a `subject` label
    ///
    /// Coin ids come straight from clients, and an unknown id fails on every
    /// tick, so only counters a valid coin can reach are labelled. Label
    /// series are never removed from the exporter.
    pub fn labelled_by_subject(self) -> bool {
        matches!(self, Self::SamplesRecorded)
    }
}

/// Increment a counter, labelled by coin where the metric allows it
pub fn increment_counter(metric: CounterMetric, subject: &str) {
    if metric.labelled_by_subject() {
        counter!(metric.name(), "subject" => subject.to_string()).increment(1);
    } else {
        counter!(metric.name()).increment(1);
    }
}

/// Set a gauge value
pub fn set_gauge(metric: GaugeMetric, value: f64) {
    let metric_name = match metric {
        GaugeMetric::TrackedSubjects => "coin_tracker_tracked_subjects",
    };

    gauge!(metric_name).set(value);
}
