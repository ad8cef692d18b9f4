use dotenvy::dotenv;
use eyre::Result;
use std::{env, time::Duration};
use tracing::info;

use crate::aggregator::{DEFAULT_FETCH_CONCURRENCY, DEFAULT_TRANSACTION_LIMIT, MAX_FETCH_CONCURRENCY};

pub const DEFAULT_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub rpc_http_url: String,
    pub request_timeout: Duration,
    pub call_deadline: Option<Duration>, // per chain query, unset = no deadline
    pub retry_initial_interval: Duration,
    pub retry_max_elapsed: Option<Duration>, // None = no retry wrapper
    pub transaction_limit: usize,
    pub fetch_concurrency: usize,
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl Config {
    /// Build from any key → value source; unset or unparsable keys take defaults
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse_u64 = |key: &str| lookup(key).and_then(|v| v.trim().parse::<u64>().ok());

        // ✅ RPC URL (alias support)
        let rpc_http_url = lookup("RPC_HTTP_URL")
            .or_else(|| lookup("SOLANA_RPC_URL"))
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());

        let request_timeout = Duration::from_millis(parse_u64("RPC_TIMEOUT_MS").unwrap_or(10_000));

        let call_deadline = parse_u64("CALL_DEADLINE_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let retry_initial_interval =
            Duration::from_millis(parse_u64("RPC_RETRY_INITIAL_MS").unwrap_or(200).max(1));

        let retry_max_elapsed = parse_u64("RPC_RETRY_MAX_ELAPSED_MS")
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);

        let transaction_limit = parse_u64("TX_LIMIT")
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_TRANSACTION_LIMIT);

        // ✅ Detail fan-out, clamped to 1..=16
        let fetch_concurrency = parse_u64("FETCH_CONCURRENCY")
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_FETCH_CONCURRENCY)
            .clamp(1, MAX_FETCH_CONCURRENCY);

        let port = lookup("PORT")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(8080);

        Self {
            rpc_http_url,
            request_timeout,
            call_deadline,
            retry_initial_interval,
            retry_max_elapsed,
            transaction_limit,
            fetch_concurrency,
            port,
        }
    }
}

pub fn load() -> Result<Config> {
    dotenv().ok(); // ✅ Load from .env file

    let cfg = Config::from_lookup(|key| env::var(key).ok());

    info!("Loaded config: {:?}", cfg);

    Ok(cfg)
}
