//! alertbridge - Entry Point
//!
//! Receives TradingView webhook alerts and places Alpaca orders.

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};

use alertbridge_bot::config::resolve_config_path;

/// TradingView webhook to Alpaca order bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via ALERTBRIDGE_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional; real environment variables take precedence.
    let dotenv = dotenvy::dotenv();

    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let config = alertbridge_bot::AppConfig::load(config_path.as_deref())?;

    alertbridge_telemetry::init_logging(config.server.debug)?;

    info!("Starting alertbridge v{}", env!("CARGO_PKG_VERSION"));
    if let Ok(path) = dotenv {
        info!(path = %path.display(), "Loaded .env");
    }
    match &config_path {
        Some(path) => info!(config_path = %path.display(), "Configuration loaded"),
        None => warn!("No config file found, using defaults and environment"),
    }

    let app = alertbridge_bot::Application::new(config)?;
    app.run().await?;

    info!("alertbridge stopped");
    Ok(())
}
