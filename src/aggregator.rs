// src/aggregator.rs
use futures_util::{stream, StreamExt, TryStreamExt};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::address::WalletAddress;
use crate::client::ChainClient;
use crate::error::TransportError;
use crate::models::{
    BalanceAnalysis, BalanceStatus, Section, TokenAnalysis, TransactionAnalysis, WalletSummary,
};
use crate::parser;
use crate::rpc::Transport;

/// Balances strictly above this many SOL are "Healthy"
pub const HEALTHY_BALANCE_THRESHOLD: Decimal = Decimal::ONE;

pub const DEFAULT_TRANSACTION_LIMIT: usize = 10;
/// Most signatures a node returns for one `getSignaturesForAddress`
pub const MAX_TRANSACTION_LIMIT: usize = 1000;
pub const DEFAULT_FETCH_CONCURRENCY: usize = 8;
pub const MAX_FETCH_CONCURRENCY: usize = 16;

/// Per-wallet orchestration over the chain client. Holds no state between
/// calls; every summary owns its own working set.
pub struct WalletAggregator<T> {
    client: ChainClient<T>,
    transaction_limit: usize,
    fetch_concurrency: usize,
}

impl<T: Transport> WalletAggregator<T> {
    pub fn new(client: ChainClient<T>) -> Self {
        Self {
            client,
            transaction_limit: DEFAULT_TRANSACTION_LIMIT,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
        }
    }

    pub fn with_transaction_limit(mut self, limit: usize) -> Self {
        self.transaction_limit = limit.min(MAX_TRANSACTION_LIMIT);
        self
    }

    /// In-flight detail fetches, clamped to 1..=16
    pub fn with_fetch_concurrency(mut self, n: usize) -> Self {
        self.fetch_concurrency = n.clamp(1, MAX_FETCH_CONCURRENCY);
        self
    }

    pub fn client(&self) -> &ChainClient<T> {
        &self.client
    }

    pub fn transaction_limit(&self) -> usize {
        self.transaction_limit
    }

    pub async fn analyze_balance(
        &self,
        address: &WalletAddress,
    ) -> Result<BalanceAnalysis, TransportError> {
        let balance = self.client.get_balance(address.as_str()).await?;
        let balance_status = if balance > HEALTHY_BALANCE_THRESHOLD {
            BalanceStatus::Healthy
        } else {
            BalanceStatus::Low
        };

        Ok(BalanceAnalysis {
            wallet: address.to_string(),
            balance_sol: balance,
            balance_status,
        })
    }

    /// Fetch up to `limit` signatures (capped at 1000) and their details.
    /// Details are fetched concurrently but records keep the node's signature order.
    pub async fn analyze_transactions(
        &self,
        address: &WalletAddress,
        limit: usize,
    ) -> Result<TransactionAnalysis, TransportError> {
        let signatures = self
            .client
            .get_signatures_for_address(address.as_str(), limit.min(MAX_TRANSACTION_LIMIT))
            .await?;

        let client = &self.client;
        let wallet = address.as_str();
        let records = stream::iter(signatures)
            .map(|entry| async move {
                let detail = client.get_transaction(&entry.signature).await?;
                Ok::<_, TransportError>(parser::decode_transaction_record(&entry, detail, wallet))
            })
            .buffered(self.fetch_concurrency)
            .try_collect::<Vec<_>>()
            .await?;

        Ok(TransactionAnalysis::from_records(records))
    }

    pub async fn analyze_tokens(
        &self,
        address: &WalletAddress,
    ) -> Result<TokenAnalysis, TransportError> {
        let accounts = self
            .client
            .get_token_accounts_by_owner(address.as_str())
            .await?;
        let holdings = accounts.into_iter().map(parser::decode_token_holding).collect();

        Ok(TokenAnalysis::from_holdings(holdings))
    }

    /// All three analyses; each section succeeds or fails on its own
    pub async fn generate_summary(&self, address: &WalletAddress) -> WalletSummary {
        info!("🔎 Analyzing wallet {}", address);

        let (balance, transactions, tokens) = tokio::join!(
            self.analyze_balance(address),
            self.analyze_transactions(address, self.transaction_limit),
            self.analyze_tokens(address),
        );

        if let Err(e) = &balance {
            warn!("Balance analysis failed for {}: {}", address, e);
        }
        if let Err(e) = &transactions {
            warn!("Transaction analysis failed for {}: {}", address, e);
        }
        if let Err(e) = &tokens {
            warn!("Token analysis failed for {}: {}", address, e);
        }

        WalletSummary {
            wallet_address: address.to_string(),
            balance_analysis: Section::from(balance),
            transaction_analysis: Section::from(transactions),
            token_analysis: Section::from(tokens),
        }
    }
}
