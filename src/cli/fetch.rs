//! Fetch command implementation

use crate::config::Config;
use crate::source::{CoinGeckoClient, PriceSource};
use clap::Args;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// CoinGecko coin id (e.g., "bitcoin")
    pub coin: String,
}

impl FetchArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = CoinGeckoClient::with_config(config.source.client_config())?;
        let price = client.fetch_value(&self.coin).await?;

        println!("{} = {} {}", self.coin, price, client.vs_currency());
        Ok(())
    }
}
