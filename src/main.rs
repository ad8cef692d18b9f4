use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use wallet_analyzer::{api, build_aggregator, config};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stdout)
        .with_target(false)
        .init();

    info!("Wallet Analyzer starting...");

    let cfg = config::load()?;
    info!("  RPC URL: {}", cfg.rpc_http_url);
    info!("  Port: {}", cfg.port);
    info!("  Transaction limit: {}", cfg.transaction_limit);
    info!("  Fetch concurrency: {}", cfg.fetch_concurrency);
    info!("  Call deadline: {:?}", cfg.call_deadline);
    info!("  Retry budget: {:?}", cfg.retry_max_elapsed);

    let aggregator = Arc::new(build_aggregator(&cfg)?);

    let api_handle = tokio::spawn({
        let cfg = cfg.clone();
        let aggregator = Arc::clone(&aggregator);
        async move { api::serve(cfg, aggregator).await }
    });

    tokio::select! {
        res = api_handle => match res {
            Ok(Ok(_)) => info!("API exited cleanly"),
            Ok(Err(e)) => error!("API error: {:?}", e),
            Err(e) => error!("API task panicked: {:?}", e),
        },
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received, stopping...");
        }
    }

    info!("Wallet Analyzer stopped.");
    Ok(())
}
