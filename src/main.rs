use clap::Parser;
use coin_tracker::cli::{Cli, Commands};
use coin_tracker::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A missing .env is fine; the environment may already be set
    let dotenv = dotenvy::dotenv();

    // Load configuration
    let mut config = Config::load(&cli.config).unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config from {}: {}", cli.config, e);
        eprintln!("Using default configuration");
        Config::default()
    });
    config.apply_env()?;

    // Initialize telemetry
    if !matches!(cli.command, Commands::Config) {
        coin_tracker::telemetry::init_telemetry(&config.telemetry)?;
    }

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    match cli.command {
        Commands::Serve(args) => {
            tracing::info!("Starting tracking service");
            args.execute(config).await?;
        }
        Commands::Fetch(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            println!("Current configuration:");
            println!("  Server: {}:{}", config.server.host, config.server.port);
            println!(
                "  Tracker: poll every {}s",
                config.tracker.poll_interval_secs
            );
            println!(
                "  Source: {} ({})",
                config.source.base_url, config.source.vs_currency
            );
            println!(
                "  Storage: {:?}{}",
                config.storage.backend,
                if config.storage.database_url.is_some() {
                    " (database url set)"
                } else {
                    ""
                }
            );
            println!(
                "  Telemetry: level={}, format={:?}, metrics_port={:?}",
                config.telemetry.log_level,
                config.telemetry.log_format,
                config.telemetry.metrics_port
            );
        }
    }

    Ok(())
}
