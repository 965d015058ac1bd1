//! HTTP API
//!
//! JSON endpoints over the tracker:
//! - `POST /currency/add`: start tracking a coin
//! - `POST /currency/remove`: stop tracking a coin
//! - `POST /currency/price`: stored price nearest to a unix timestamp
//! - `GET /currency`: tracked coins
//! - `GET /health`: liveness

mod error;
mod handlers;

pub use error::{ApiError, ErrorBody};
pub use handlers::{CoinListResponse, CoinPriceRequest, CoinRequest, CoinResponse, PriceResponse};

use crate::tracker::Tracker;
use axum::routing::{get, post};
use axum::Router;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Shared state for the handlers
#[derive(Clone)]
pub struct AppState {
    pub tracker: Arc<Tracker>,
}

/// Create the router with all endpoints
pub fn create_router(tracker: Arc<Tracker>) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/currency", get(handlers::list_currencies))
        .route("/currency/add", post(handlers::add_currency))
        .route("/currency/remove", post(handlers::remove_currency))
        .route("/currency/price", post(handlers::get_currency_price))
        .with_state(AppState { tracker })
}

/// Serve the API until `shutdown` resolves, then stop every worker
pub async fn serve(
    listener: TcpListener,
    tracker: Arc<Tracker>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, "HTTP server listening");

    axum::serve(listener, create_router(tracker.clone()))
        .with_graceful_shutdown(shutdown)
        .await?;

    tracing::info!("HTTP server stopped, stopping workers");
    tracker.shutdown().await;
    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received Ctrl+C, shutting down"),
        () = terminate => tracing::info!("Received SIGTERM, shutting down"),
    }
}
