//! Price source module
//!
//! Fetches the current price of a coin from an external API

mod coingecko;
mod types;

pub use coingecko::{CoinGeckoClient, CoinGeckoConfig, COINGECKO_API_URL};
pub use types::{parse_price_response, FetchError, PriceValue};

use async_trait::async_trait;
use rust_decimal::Decimal;

/// Trait for price source implementations
///
/// One call is one network round-trip. Implementations must not retry;
/// the polling cadence of the worker is the retry policy.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Fetch the current price for a coin
    async fn fetch_value(&self, subject: &str) -> Result<Decimal, FetchError>;
}
