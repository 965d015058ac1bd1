//! Configuration types for coin-tracker

use crate::source::{CoinGeckoConfig, COINGECKO_API_URL};
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// HTTP server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Worker polling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TrackerConfig {
    /// Seconds between two polls of the same coin
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    10
}

/// Longest accepted poll interval (one day)
pub const MAX_POLL_INTERVAL_SECS: u64 = 86_400;

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl TrackerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// Price source configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_vs_currency")]
    pub vs_currency: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    COINGECKO_API_URL.to_string()
}
fn default_vs_currency() -> String {
    "usd".to_string()
}
fn default_timeout_secs() -> u64 {
    10
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            vs_currency: default_vs_currency(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl SourceConfig {
    /// Build the client configuration for the CoinGecko adapter
    pub fn client_config(&self) -> CoinGeckoConfig {
        CoinGeckoConfig {
            base_url: self.base_url.clone(),
            vs_currency: self.vs_currency.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Postgres,
    Memory,
}

/// Sample storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
    pub database_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    5
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            database_url: None,
            max_connections: default_max_connections(),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    pub metrics_port: Option<u16>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Apply `PORT`, `DB_URL` and `POLL_INTERVAL_SECS` from the process environment
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> anyhow::Result<()> {
        if let Some(port) = lookup("PORT").filter(|v| !v.is_empty()) {
            self.server.port = port
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid PORT '{}': {}", port, e))?;
        }

        if let Some(url) = lookup("DB_URL").filter(|v| !v.is_empty()) {
            self.storage.database_url = Some(url);
        }

        if let Some(secs) = lookup("POLL_INTERVAL_SECS").filter(|v| !v.is_empty()) {
            self.tracker.poll_interval_secs = secs
                .parse()
                .map_err(|e| anyhow::anyhow!("Invalid POLL_INTERVAL_SECS '{}': {}", secs, e))?;
        }

        Ok(())
    }

    /// Reject configurations the service cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.tracker.poll_interval_secs > 0,
            "tracker.poll_interval_secs must be greater than zero"
        );

        anyhow::ensure!(
            self.tracker.poll_interval_secs <= MAX_POLL_INTERVAL_SECS,
            "tracker.poll_interval_secs must be at most {}",
            MAX_POLL_INTERVAL_SECS
        );

        anyhow::ensure!(
            !self.source.vs_currency.trim().is_empty(),
            "source.vs_currency must not be empty"
        );

        if self.storage.backend == StorageBackend::Postgres {
            anyhow::ensure!(
                self.storage.database_url.is_some(),
                "storage.database_url (or DB_URL) is required for the postgres backend"
            );
        }

        Ok(())
    }
}
