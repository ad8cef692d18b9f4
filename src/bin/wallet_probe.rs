use anyhow::{anyhow, Context};
use wallet_analyzer::{build_aggregator, config, WalletAddress};

/// One-shot: print the summary of a single wallet as JSON.
///
/// usage: wallet_probe <address> [limit]
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let raw = args
        .next()
        .ok_or_else(|| anyhow!("usage: wallet_probe <address> [limit]"))?;
    let address = WalletAddress::parse(&raw)?;

    let mut cfg = config::load().map_err(|e| anyhow!("{e}"))?;
    if let Some(limit) = args.next() {
        cfg.transaction_limit = limit.parse().context("limit must be a number")?;
    }

    println!("Fetching wallet summary from {}...", cfg.rpc_http_url);

    let aggregator = build_aggregator(&cfg)?;
    let summary = aggregator.generate_summary(&address).await;

    if let Some(err) = summary.balance_analysis.error() {
        eprintln!("Balance section failed: {}", err);
    }
    if let Some(err) = summary.transaction_analysis.error() {
        eprintln!("Transaction section failed: {}", err);
    }
    if let Some(err) = summary.token_analysis.error() {
        eprintln!("Token section failed: {}", err);
    }

    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
