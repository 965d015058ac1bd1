//! coin-tracker: per-coin price tracking service
//!
//! This library provides the core components for:
//! - A registry of polling workers, at most one per coin
//! - Periodic price capture from CoinGecko
//! - Sample storage in PostgreSQL or memory with nearest-timestamp lookup
//! - An HTTP API to start, stop and query tracking
//! - Logging and Prometheus metrics

pub mod api;
pub mod cli;
pub mod config;
pub mod source;
pub mod store;
pub mod telemetry;
pub mod tracker;
