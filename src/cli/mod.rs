//! CLI interface for coin-tracker
//!
//! Provides subcommands for:
//! - `serve`: Run the HTTP tracking service
//! - `fetch`: Fetch one price from the source and print it
//! - `config`: Show the effective configuration

mod fetch;
mod serve;

pub use fetch::FetchArgs;
pub use serve::ServeArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "coin-tracker")]
#[command(about = "Tracks cryptocurrency prices with one polling worker per coin")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP tracking service
    Serve(ServeArgs),
    /// Fetch the current price of a coin once
    Fetch(FetchArgs),
    /// Show the effective configuration
    Config,
}
