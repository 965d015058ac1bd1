//! Request handlers for the currency endpoints

use super::{ApiError, AppState};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::{TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Body of add/remove requests
#[derive(Debug, Serialize, Deserialize)]
pub struct CoinRequest {
    /// CoinGecko coin id
    pub coin: String,
}

/// Body of price requests
#[derive(Debug, Serialize, Deserialize)]
pub struct CoinPriceRequest {
    pub coin: String,
    /// Unix seconds
    pub timestamp: i64,
}

/// Acknowledgment for add/remove
#[derive(Debug, Serialize, Deserialize)]
pub struct CoinResponse {
    pub message: String,
    pub coin: String,
}

/// Stored price closest to the requested time
#[derive(Debug, Serialize, Deserialize)]
pub struct PriceResponse {
    pub coin: String,
    pub price: Decimal,
    /// Unix seconds of the sample
    pub timestamp: i64,
}

/// Tracked coins
#[derive(Debug, Serialize, Deserialize)]
pub struct CoinListResponse {
    pub coins: Vec<String>,
}

fn require_coin(coin: &str) -> Result<(), ApiError> {
    if coin.trim().is_empty() {
        return Err(ApiError::bad_request("coin must not be empty"));
    }
    Ok(())
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "OK"
}

/// Start tracking a coin
pub async fn add_currency(
    State(state): State<AppState>,
    payload: Result<Json<CoinRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CoinResponse>), ApiError> {
    let Json(req) = payload?;
    require_coin(&req.coin)?;
    state.tracker.start_tracking(&req.coin).await?;

    Ok((
        StatusCode::CREATED,
        Json(CoinResponse {
            message: "Currency added and runner started".to_string(),
            coin: req.coin,
        }),
    ))
}

/// Stop tracking a coin
pub async fn remove_currency(
    State(state): State<AppState>,
    payload: Result<Json<CoinRequest>, JsonRejection>,
) -> Result<Json<CoinResponse>, ApiError> {
    let Json(req) = payload?;
    require_coin(&req.coin)?;
    state.tracker.stop_tracking(&req.coin).await?;

    Ok(Json(CoinResponse {
        message: "Currency removed and runner stopped".to_string(),
        coin: req.coin,
    }))
}

/// Price of a coin closest to a timestamp
pub async fn get_currency_price(
    State(state): State<AppState>,
    payload: Result<Json<CoinPriceRequest>, JsonRejection>,
) -> Result<Json<PriceResponse>, ApiError> {
    let Json(req) = payload?;
    require_coin(&req.coin)?;
    let at = Utc
        .timestamp_opt(req.timestamp, 0)
        .single()
        .ok_or_else(|| {
            ApiError::bad_request(format!("timestamp out of range: {}", req.timestamp))
        })?;

    let sample = state.tracker.query_price(&req.coin, at).await?;

    Ok(Json(PriceResponse {
        coin: req.coin,
        price: sample.value,
        timestamp: sample.timestamp.timestamp(),
    }))
}

/// List tracked coins
pub async fn list_currencies(State(state): State<AppState>) -> Json<CoinListResponse> {
    Json(CoinListResponse {
        coins: state.tracker.tracked().await,
    })
}
