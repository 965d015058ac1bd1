//! Integration tests for the tracker lifecycle

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use coin_tracker::source::{FetchError, PriceSource};
use coin_tracker::store::{InMemorySampleStore, SampleStore};
use coin_tracker::tracker::{Tracker, TrackerError};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use std::time::Duration;

const INTERVAL: Duration = Duration::from_secs(10);

/// Price per coin, unknown coins fail
struct QuoteBoard;

#[async_trait]
impl PriceSource for QuoteBoard {
    async fn fetch_value(&self, subject: &str) -> Result<Decimal, FetchError> {
        match subject {
            "bitcoin" => Ok(dec!(50000)),
            "ethereum" => Ok(dec!(2500)),
            other => Err(FetchError::SubjectMissing(other.to_string())),
        }
    }
}

/// Takes five seconds per fetch
struct SlowSource;

#[async_trait]
impl PriceSource for SlowSource {
    async fn fetch_value(&self, _subject: &str) -> Result<Decimal, FetchError> {
        tokio::time::sleep(Duration::from_secs(5)).await;
        Ok(dec!(1))
    }
}

fn tracker_with(source: Arc<dyn PriceSource>, store: Arc<InMemorySampleStore>) -> Arc<Tracker> {
    Arc::new(Tracker::new(source, store, INTERVAL))
}

#[tokio::test]
async fn test_start_is_acknowledged_before_first_poll() {
    let store = Arc::new(InMemorySampleStore::new());
    let tracker = tracker_with(Arc::new(QuoteBoard), store.clone());

    tracker.start_tracking("bitcoin").await.unwrap();
    assert!(tracker.is_tracked("bitcoin").await);
    assert_eq!(store.count("bitcoin").await, 0);

    tracker.shutdown().await;
}

#[tokio::test]
async fn test_registry_conflicts() {
    let tracker = tracker_with(Arc::new(QuoteBoard), Arc::new(InMemorySampleStore::new()));

    let err = tracker.stop_tracking("bitcoin").await.unwrap_err();
    assert!(matches!(err, TrackerError::NotTracked(_)));

    tracker.start_tracking("bitcoin").await.unwrap();
    let err = tracker.start_tracking("bitcoin").await.unwrap_err();
    assert!(matches!(err, TrackerError::AlreadyTracked(_)));

    tracker.stop_tracking("bitcoin").await.unwrap();
    tracker.start_tracking("bitcoin").await.unwrap();
    tracker.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_two_subjects_run_independently() {
    let store = Arc::new(InMemorySampleStore::new());
    let tracker = tracker_with(Arc::new(QuoteBoard), store.clone());

    let (a, b) = tokio::join!(
        tracker.start_tracking("bitcoin"),
        tracker.start_tracking("ethereum")
    );
    a.unwrap();
    b.unwrap();

    tokio::time::sleep(Duration::from_secs(35)).await;

    let btc = store.samples("bitcoin").await;
    let eth = store.samples("ethereum").await;
    assert_eq!(btc.len(), 3);
    assert_eq!(eth.len(), 3);
    assert!(btc.iter().all(|s| s.subject == "bitcoin" && s.value == dec!(50000)));
    assert!(eth.iter().all(|s| s.subject == "ethereum" && s.value == dec!(2500)));
    assert!(btc.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    // Stopping one leaves the other running
    tracker.stop_tracking("bitcoin").await.unwrap();
    tokio::time::sleep(Duration::from_secs(20)).await;
    assert_eq!(store.count("bitcoin").await, 3);
    assert_eq!(store.count("ethereum").await, 5);

    tracker.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_failing_subject_keeps_ticking() {
    let store = Arc::new(InMemorySampleStore::new());
    let tracker = tracker_with(Arc::new(QuoteBoard), store.clone());

    tracker.start_tracking("not-a-coin").await.unwrap();
    tokio::time::sleep(Duration::from_secs(45)).await;

    assert!(tracker.is_tracked("not-a-coin").await);
    assert_eq!(store.count("not-a-coin").await, 0);

    tracker.stop_tracking("not-a-coin").await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn test_in_flight_tick_completes_after_stop() {
    let store = Arc::new(InMemorySampleStore::new());
    let tracker = tracker_with(Arc::new(SlowSource), store.clone());

    tracker.start_tracking("bitcoin").await.unwrap();

    // Tick starts at 10s and its fetch finishes at 15s
    tokio::time::sleep(Duration::from_secs(12)).await;
    assert_eq!(store.count("bitcoin").await, 0);
    tracker.stop_tracking("bitcoin").await.unwrap();

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(store.count("bitcoin").await, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_starts_one_winner() {
    let tracker = tracker_with(Arc::new(QuoteBoard), Arc::new(InMemorySampleStore::new()));

    let handles: Vec<_> = (0..32)
        .map(|_| {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.start_tracking("bitcoin").await })
        })
        .collect();

    let mut ok = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => ok += 1,
            Err(TrackerError::AlreadyTracked(_)) => conflicts += 1,
            Err(e) => panic!("unexpected error: {e}"),
        }
    }

    assert_eq!(ok, 1);
    assert_eq!(conflicts, 31);
    assert_eq!(tracker.tracked().await, vec!["bitcoin"]);
    tracker.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_start_stop_stays_consistent() {
    let tracker = tracker_with(Arc::new(QuoteBoard), Arc::new(InMemorySampleStore::new()));

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let tracker = tracker.clone();
            tokio::spawn(async move {
                for _ in 0..20 {
                    if i % 2 == 0 {
                        let _ = tracker.start_tracking("bitcoin").await;
                    } else {
                        let _ = tracker.stop_tracking("bitcoin").await;
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap();
    }

    let tracked = tracker.tracked().await;
    assert!(tracked.is_empty() || tracked == vec!["bitcoin"]);
    tracker.shutdown().await;
    assert!(tracker.tracked().await.is_empty());
}

#[tokio::test]
async fn test_query_nearest_with_tie_toward_later() {
    let store = Arc::new(InMemorySampleStore::new());
    let ts = |secs| Utc.timestamp_opt(secs, 0).unwrap();
    store.append_sample("bitcoin", dec!(50000), ts(100)).await.unwrap();
    store.append_sample("bitcoin", dec!(51000), ts(200)).await.unwrap();
    let tracker = tracker_with(Arc::new(QuoteBoard), store);

    let at_140 = tracker.query_price("bitcoin", ts(140)).await.unwrap();
    assert_eq!((at_140.value, at_140.timestamp), (dec!(50000), ts(100)));

    let at_160 = tracker.query_price("bitcoin", ts(160)).await.unwrap();
    assert_eq!((at_160.value, at_160.timestamp), (dec!(51000), ts(200)));

    let at_150 = tracker.query_price("bitcoin", ts(150)).await.unwrap();
    assert_eq!((at_150.value, at_150.timestamp), (dec!(51000), ts(200)));

    let err = tracker.query_price("ethereum", ts(150)).await.unwrap_err();
    assert!(matches!(err, TrackerError::NotFound(_)));
}
