//! CoinGecko simple-price client

use super::{parse_price_response, FetchError, PriceSource};
use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::time::{Duration, Instant};

/// CoinGecko API base URL
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Configuration for the CoinGecko client
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Quote currency (e.g., "usd")
    pub vs_currency: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_API_URL.to_string(),
            vs_currency: "usd".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for CoinGecko's `/simple/price` endpoint
pub struct CoinGeckoClient {
    config: CoinGeckoConfig,
    client: Client,
}

impl CoinGeckoClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(CoinGeckoConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: CoinGeckoConfig) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("coin-tracker/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { config, client })
    }

    /// Configured quote currency
    pub fn vs_currency(&self) -> &str {
        &self.config.vs_currency
    }

    fn price_url(&self) -> String {
        format!("{}/simple/price", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl PriceSource for CoinGeckoClient {
    async fn fetch_value(&self, subject: &str) -> Result<Decimal, FetchError> {
        let url = self.price_url();
        let started = Instant::now();

        tracing::debug!(url = %url, coin = subject, "Fetching price");

        let response = self
            .client
            .get(&url)
            .query(&[("ids", subject), ("vs_currencies", self.vs_currency())])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        crate::telemetry::record_latency(
            crate::telemetry::LatencyMetric::PriceFetch,
            started.elapsed(),
        );

        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::trace!(coin = subject, body = %body, "Price API response");

        parse_price_response(&body, subject, self.vs_currency())
    }
}
