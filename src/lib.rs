//! Solana wallet analysis: typed RPC queries, per-wallet aggregation with
//! section-level failure isolation, and a fixed-layout feature vector for an
//! external scoring model.
pub mod address;
pub mod aggregator;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod features;
pub mod mentions;
pub mod models;
pub mod parser;
pub mod rpc;
pub mod scoring;

pub use address::{extract_wallet_address, WalletAddress};
pub use aggregator::WalletAggregator;
pub use client::ChainClient;
pub use config::Config;
pub use error::{AddressError, FeatureError, ScoringError, TransportError};
pub use features::{extract_features, FeatureVector, TradeInput};
pub use models::WalletSummary;
pub use rpc::{HttpTransport, RetryTransport, Transport};

use std::sync::Arc;

/// Transport stack described by `cfg`: HTTP, optionally wrapped in retries
pub fn build_transport(cfg: &Config) -> Result<Arc<dyn Transport>, TransportError> {
    let http = HttpTransport::new(cfg.rpc_http_url.clone(), cfg.request_timeout)?;
    Ok(match cfg.retry_max_elapsed {
        Some(max_elapsed) => Arc::new(RetryTransport::new(
            http,
            cfg.retry_initial_interval,
            max_elapsed,
        )),
        None => Arc::new(http),
    })
}

/// Aggregator wired from `cfg`
pub fn build_aggregator(cfg: &Config) -> Result<WalletAggregator<Arc<dyn Transport>>, TransportError> {
    let client = ChainClient::new(build_transport(cfg)?).with_deadline(cfg.call_deadline);
    Ok(WalletAggregator::new(client)
        .with_transaction_limit(cfg.transaction_limit)
        .with_fetch_concurrency(cfg.fetch_concurrency))
}
