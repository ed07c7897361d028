//! Submit a single routed order outside the webhook path.
//!
//! Classifies the current session, routes the order the same way the worker
//! does and submits it. With `--dry-run` only the intent is printed.

use anyhow::{Context, Result};
use clap::Parser;

use alertbridge_bot::config::resolve_config_path;
use alertbridge_bot::AppConfig;
use alertbridge_broker::{AlpacaClient, Brokerage};
use alertbridge_core::{current_session, Alert, SystemClock};

#[derive(Parser, Debug)]
#[command(about = "Submit one order through the configured brokerage")]
struct Args {
    /// Ticker symbol, e.g. AAPL
    #[arg(long)]
    symbol: String,

    /// Order side (buy/sell)
    #[arg(long, default_value = "buy")]
    side: String,

    /// Print the order without submitting it
    #[arg(long)]
    dry_run: bool,

    /// Configuration file path
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    let args = Args::parse();

    let config_path = resolve_config_path(args.config.as_deref());
    let config = AppConfig::load(config_path.as_deref())?;
    alertbridge_telemetry::init_logging(true)?;

    let client = AlpacaClient::new(&config.broker_config()).context("building brokerage client")?;

    let alert = Alert {
        ticker: args.symbol,
        strategy: args.side.to_lowercase(),
        passphrase: None,
    };

    let session = current_session(&SystemClock);
    tracing::info!(%session, symbol = %alert.ticker, side = %alert.strategy, "Routing test order");

    let intent = config
        .router()
        .route(&alert, session, &client)
        .await
        .context("routing order")?;

    println!("{}", serde_json::to_string_pretty(&intent)?);

    if args.dry_run {
        tracing::info!("Dry run, not submitting");
        return Ok(());
    }

    let ack = client.submit_order(&intent).await.context("submitting order")?;
    tracing::info!(
        order_id = %ack.id,
        status = %ack.status,
        client_order_id = %intent.client_order_id,
        "Test order accepted"
    );
    Ok(())
}
