//! End-to-end test: HTTP server, tracker workers, mock upstream and in-memory store

use coin_tracker::api::{self, CoinListResponse, PriceResponse};
use coin_tracker::config::{Config, StorageBackend};
use coin_tracker::source::CoinGeckoClient;
use coin_tracker::store::InMemorySampleStore;
use coin_tracker::tracker::Tracker;
use rust_decimal_macros::dec;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn test_example_config_loads() {
    let config = Config::load("config.toml.example").unwrap();
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.tracker.poll_interval_secs, 10);
    assert_eq!(config.source.vs_currency, "usd");
    assert_eq!(config.storage.backend, StorageBackend::Postgres);
    assert!(config.validate().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_track_and_query_over_http() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .and(query_param("ids", "bitcoin"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bitcoin": {"usd": 64000.5}
        })))
        .mount(&upstream)
        .await;

    let mut config = Config::default();
    config.source.base_url = upstream.uri();
    config.storage.backend = StorageBackend::Memory;

    let store = Arc::new(InMemorySampleStore::new());
    let source = Arc::new(CoinGeckoClient::with_config(config.source.client_config()).unwrap());
    let tracker = Arc::new(Tracker::new(source, store.clone(), Duration::from_millis(200)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(api::serve(listener, tracker.clone(), async {
        let _ = stop_rx.await;
    }));

    let http = reqwest::Client::new();

    let resp = http
        .post(format!("{base}/currency/add"))
        .json(&json!({"coin": "bitcoin"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);

    let resp = http
        .post(format!("{base}/currency/add"))
        .json(&json!({"coin": "bitcoin"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 409);

    // Wait for the worker to record a few samples
    let mut recorded = 0;
    for _ in 0..50 {
        recorded = store.count("bitcoin").await;
        if recorded >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    assert!(recorded >= 2, "worker recorded {recorded} samples");

    let now = chrono::Utc::now().timestamp();
    let price: PriceResponse = http
        .post(format!("{base}/currency/price"))
        .json(&json!({"coin": "bitcoin", "timestamp": now}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(price.coin, "bitcoin");
    assert_eq!(price.price, dec!(64000.5));
    assert!((price.timestamp - now).abs() <= 5);

    let list: CoinListResponse = http
        .get(format!("{base}/currency"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(list.coins, vec!["bitcoin"]);

    let resp = http
        .post(format!("{base}/currency/remove"))
        .json(&json!({"coin": "bitcoin"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    // At most one in-flight tick may still land after removal
    tokio::time::sleep(Duration::from_millis(300)).await;
    let after_stop = store.count("bitcoin").await;
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(store.count("bitcoin").await, after_stop);

    // History stays queryable after removal
    let resp = http
        .post(format!("{base}/currency/price"))
        .json(&json!({"coin": "bitcoin", "timestamp": now}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 200);

    let _ = stop_tx.send(());
    server.await.unwrap().unwrap();
    assert!(tracker.tracked().await.is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_shutdown_stops_running_workers() {
    let upstream = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/simple/price"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ethereum": {"usd": "3100.75"}
        })))
        .mount(&upstream)
        .await;

    let mut config = Config::default();
    config.source.base_url = upstream.uri();

    let store = Arc::new(InMemorySampleStore::new());
    let source = Arc::new(CoinGeckoClient::with_config(config.source.client_config()).unwrap());
    let tracker = Arc::new(Tracker::new(source, store.clone(), Duration::from_millis(100)));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let server = tokio::spawn(api::serve(listener, tracker.clone(), async {
        let _ = stop_rx.await;
    }));

    tracker.start_tracking("ethereum").await.unwrap();
    tokio::time::sleep(Duration::from_millis(350)).await;

    let _ = stop_tx.send(());
    server.await.unwrap().unwrap();

    let after_shutdown = store.count("ethereum").await;
    assert!(after_shutdown >= 1);
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(store.count("ethereum").await, after_shutdown);
}
