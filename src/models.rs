// src/models.rs
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::features::TradeInput;

/// Native-unit (SOL) amount
pub type Balance = Decimal;

/// Lamports per SOL
pub const UNIT_SCALE: u64 = 1_000_000_000;

/// Minimal units → native units, always `raw / UNIT_SCALE`
pub fn lamports_to_sol(lamports: u64) -> Balance {
    Decimal::from(lamports) / Decimal::from(UNIT_SCALE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BalanceStatus {
    Healthy,
    Low,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BalanceAnalysis {
    pub wallet: String,
    pub balance_sol: Balance,
    pub balance_status: BalanceStatus,
}

/// One signature joined with its detail fetch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionRecord {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>, // unix seconds
    pub succeeded: bool,
    pub fee: Balance,
    pub balance_change: Balance, // |post - pre| for the analyzed wallet
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransactionAnalysis {
    pub transaction_count: usize,
    pub successful_transactions: usize,
    pub total_fees: Balance,
    pub average_fee: Balance,
    pub transactions: Vec<TransactionRecord>,
}

impl TransactionAnalysis {
    /// Statistics over records kept in the order given
    pub fn from_records(transactions: Vec<TransactionRecord>) -> Self {
        let transaction_count = transactions.len();
        let successful_transactions = transactions.iter().filter(|tx| tx.succeeded).count();
        let total_fees: Balance = transactions.iter().map(|tx| tx.fee).sum();
        let average_fee = if transaction_count == 0 {
            Decimal::ZERO
        } else {
            total_fees / Decimal::from(transaction_count)
        };

        Self {
            transaction_count,
            successful_transactions,
            total_fees,
            average_fee,
            transactions,
        }
    }

    /// Records with a known block time, shaped as feature-extractor input
    pub fn trade_history(&self) -> Vec<TradeInput> {
        self.transactions
            .iter()
            .filter_map(|tx| {
                let date = chrono::DateTime::from_timestamp(tx.block_time?, 0)?
                    .date_naive()
                    .format("%Y-%m-%d")
                    .to_string();
                Some(TradeInput {
                    amount: tx.balance_change.to_f64(),
                    status: Some(if tx.succeeded { "success" } else { "failure" }.to_string()),
                    date: Some(date),
                })
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenHolding {
    pub account: Option<String>,
    pub token_address: Option<String>, // mint
    pub decimals: u8,
    pub balance: Decimal, // already unit-adjusted by the node
    pub balance_in_base_units: Decimal,
}

impl TokenHolding {
    pub fn empty(account: Option<String>, token_address: Option<String>) -> Self {
        Self {
            account,
            token_address,
            decimals: 0,
            balance: Decimal::ZERO,
            balance_in_base_units: Decimal::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenAnalysis {
    pub token_count: usize,
    pub tokens: Vec<TokenHolding>,
}

impl TokenAnalysis {
    pub fn from_holdings(tokens: Vec<TokenHolding>) -> Self {
        Self {
            token_count: tokens.len(),
            tokens,
        }
    }
}

/// Either a section's data or the reason it could not be produced
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Section<T> {
    Ok(T),
    Failed { error: String },
}

impl<T> Section<T> {
    pub fn data(&self) -> Option<&T> {
        match self {
            Section::Ok(v) => Some(v),
            Section::Failed { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Section::Ok(_) => None,
            Section::Failed { error } => Some(error),
        }
    }
}

impl<T, E: std::fmt::Display> From<Result<T, E>> for Section<T> {
    fn from(r: Result<T, E>) -> Self {
        match r {
            Ok(v) => Section::Ok(v),
            Err(e) => Section::Failed {
                error: e.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletSummary {
    pub wallet_address: String,
    pub balance_analysis: Section<BalanceAnalysis>,
    pub transaction_analysis: Section<TransactionAnalysis>,
    pub token_analysis: Section<TokenAnalysis>,
}

/// Node-side chain info decoded by the query client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureInfo {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenAmount {
    pub amount: Option<String>, // raw base units as reported
    pub decimals: u8,
    pub ui_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgramAccount {
    pub pubkey: String,
    pub owner: Option<String>,
    pub lamports: Balance,
    pub executable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSample {
    pub slot: u64,
    pub num_transactions: u64,
    pub num_slots: u64,
    pub sample_period_secs: u64,
}

impl PerformanceSample {
    pub fn transactions_per_second(&self) -> f64 {
        if self.sample_period_secs == 0 {
            0.0
        } else {
            self.num_transactions as f64 / self.sample_period_secs as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn record(sig: &str, succeeded: bool, fee_lamports: u64) -> TransactionRecord {
        TransactionRecord {
            signature: sig.to_string(),
            slot: 1,
            block_time: None,
            succeeded,
            fee: lamports_to_sol(fee_lamports),
            balance_change: Decimal::ZERO,
        }
    }

    #[test]
    fn lamports_convert_by_fixed_scale() {
        assert_eq!(lamports_to_sol(0), Decimal::ZERO);
        assert_eq!(lamports_to_sol(1_500_000_000), Decimal::from_str("1.5").unwrap());
        assert_eq!(lamports_to_sol(5000), Decimal::from_str("0.000005").unwrap());
        assert_eq!(lamports_to_sol(u64::MAX) * Decimal::from(UNIT_SCALE), Decimal::from(u64::MAX));
    }

    #[test]
    fn empty_history_has_zero_stats() {
        let analysis = TransactionAnalysis::from_records(vec![]);
        assert_eq!(analysis.transaction_count, 0);
        assert_eq!(analysis.successful_transactions, 0);
        assert_eq!(analysis.total_fees, Decimal::ZERO);
        assert_eq!(analysis.average_fee, Decimal::ZERO);
        assert!(analysis.transactions.is_empty());
    }

    #[test]
    fn fee_stats_over_records() {
        let analysis = TransactionAnalysis::from_records(vec![
            record("a", true, 5000),
            record("b", false, 10000),
            record("c", true, 0),
        ]);
        assert_eq!(analysis.transaction_count, 3);
        assert_eq!(analysis.successful_transactions, 2);
        assert_eq!(analysis.total_fees, Decimal::from_str("0.000015").unwrap());
        assert_eq!(analysis.average_fee, Decimal::from_str("0.000005").unwrap());
    }

    #[test]
    fn trade_history_skips_records_without_block_time() {
        let mut dated = record("a", true, 5000);
        dated.block_time = Some(1_730_419_200); // 2024-11-01T00:00:00Z
        dated.balance_change = Decimal::from_str("1.5").unwrap();
        let analysis = TransactionAnalysis::from_records(vec![dated, record("b", false, 0)]);

        let trades = analysis.trade_history();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].date.as_deref(), Some("2024-11-01"));
        assert_eq!(trades[0].status.as_deref(), Some("success"));
        assert_eq!(trades[0].amount, Some(1.5));
    }

    #[test]
    fn failed_section_serializes_error_marker() {
        let section: Section<TokenAnalysis> = Err::<TokenAnalysis, _>("RPC request timed out").into();
        assert_eq!(
            serde_json::to_value(&section).unwrap(),
            serde_json::json!({ "error": "RPC request timed out" })
        );
    }
}
