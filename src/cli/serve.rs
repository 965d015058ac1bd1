//! Serve command implementation

use crate::api;
use crate::config::{Config, StorageBackend};
use crate::source::CoinGeckoClient;
use crate::store::{InMemorySampleStore, PgSampleStore, SampleStore};
use crate::tracker::Tracker;
use clap::Args;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Listen port (overrides config and PORT)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Keep samples in memory instead of PostgreSQL
    #[arg(long)]
    pub memory: bool,
}

impl ServeArgs {
    /// Apply command-line overrides to the loaded configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.memory {
            config.storage.backend = StorageBackend::Memory;
        }
    }

    pub async fn execute(&self, mut config: Config) -> anyhow::Result<()> {
        self.apply(&mut config);
        config.validate()?;

        let store = open_store(&config).await?;
        let source = Arc::new(CoinGeckoClient::with_config(config.source.client_config())?);
        let tracker = Arc::new(Tracker::new(
            source,
            store,
            config.tracker.poll_interval(),
        ));

        let addr = format!("{}:{}", config.server.host, config.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to bind {}: {}", addr, e))?;

        tracing::info!(
            poll_interval_secs = config.tracker.poll_interval_secs,
            backend = ?config.storage.backend,
            "Starting coin tracker"
        );

        api::serve(listener, tracker, api::shutdown_signal()).await
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn SampleStore>> {
    match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, samples are lost on exit");
            Ok(Arc::new(InMemorySampleStore::new()))
        }
        StorageBackend::Postgres => {
            let url = config
                .storage
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("Set storage.database_url or DB_URL"))?;

            let store = PgSampleStore::connect(url, config.storage.max_connections)
                .await
                .map_err(|e| anyhow::anyhow!("Can't connect to database: {}", e))?;
            store.ping().await?;
            store.ensure_schema().await?;
            Ok(Arc::new(store))
        }
    }
}
