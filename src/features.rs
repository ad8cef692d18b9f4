// src/features.rs
//! Fixed-layout feature vector derived from a trade history.
//!
//! Positions (0-based):
//! 0 transaction count, 1 total volume, 2 average volume,
//! 3 successful count, 4 transactions per year-month bucket,
//! 5 profit/loss ratio, 6 days since the most recent activity,
//! 7.. reserved, zero-filled until real signals replace them.
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::FeatureError;

/// Vector length the scoring model is trained on
pub const FEATURE_VECTOR_LEN: usize = 20;

/// First position of the reserved range
pub const RESERVED_START: usize = Feature::DaysSinceLastActivity as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    TransactionCount = 0,
    TotalVolume,
    AverageVolume,
    SuccessfulTransactions,
    TransactionFrequency,
    ProfitLossRatio,
    DaysSinceLastActivity,
}

/// A trade as received from outside: every field may be missing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeInput {
    pub amount: Option<f64>,
    pub status: Option<String>,
    pub date: Option<String>, // YYYY-MM-DD
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeStatus {
    Success,
    Failure,
}

/// A validated trade
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub amount: f64,
    pub status: TradeStatus,
    pub date: NaiveDate,
}

impl Trade {
    pub fn validate(index: usize, input: &TradeInput) -> Result<Self, FeatureError> {
        let malformed = |reason: &str| FeatureError::MalformedInput {
            index,
            reason: reason.to_string(),
        };

        let amount = input.amount.ok_or_else(|| malformed("missing amount"))?;
        if !amount.is_finite() {
            return Err(malformed("amount is not a finite number"));
        }
        if amount < 0.0 {
            return Err(malformed("amount is negative"));
        }

        let status = match input.status.as_deref() {
            Some("success") => TradeStatus::Success,
            Some("failure") => TradeStatus::Failure,
            Some(other) => return Err(malformed(&format!("unknown status {:?}", other))),
            None => return Err(malformed("missing status")),
        };

        let raw_date = input.date.as_deref().ok_or_else(|| malformed("missing date"))?;
        let date = NaiveDate::parse_from_str(raw_date, "%Y-%m-%d")
            .map_err(|_| malformed(&format!("date {:?} is not YYYY-MM-DD", raw_date)))?;

        Ok(Self {
            amount,
            status,
            date,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_VECTOR_LEN]);

impl FeatureVector {
    pub fn get(&self, feature: Feature) -> f64 {
        self.0[feature as usize]
    }

    pub fn reserved(&self) -> &[f64] {
        &self.0[RESERVED_START..]
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Success volume over failure volume; the success volume itself when nothing failed
pub fn calculate_profit_loss(trades: &[Trade]) -> f64 {
    let sum_for = |status: TradeStatus| {
        trades
            .iter()
            .filter(|t| t.status == status)
            .map(|t| t.amount)
            .sum::<f64>()
    };
    let profit = sum_for(TradeStatus::Success);
    let loss = sum_for(TradeStatus::Failure);

    if loss == 0.0 {
        profit
    } else {
        profit / loss
    }
}

/// Validate every input record, then extract against `today`
pub fn extract_features(
    inputs: &[TradeInput],
    today: NaiveDate,
) -> Result<FeatureVector, FeatureError> {
    if inputs.is_empty() {
        return Err(FeatureError::InsufficientData);
    }
    let trades = inputs
        .iter()
        .enumerate()
        .map(|(i, input)| Trade::validate(i, input))
        .collect::<Result<Vec<_>, _>>()?;

    extract_from_trades(&trades, today)
}

/// Same as [`extract_features`] with today's UTC date
pub fn extract_features_now(inputs: &[TradeInput]) -> Result<FeatureVector, FeatureError> {
    extract_features(inputs, Utc::now().date_naive())
}

pub fn extract_from_trades(trades: &[Trade], today: NaiveDate) -> Result<FeatureVector, FeatureError> {
    // Recency is taken from the latest date, so input order does not matter here.
    let latest = trades
        .iter()
        .map(|t| t.date)
        .max()
        .ok_or(FeatureError::InsufficientData)?;

    let count = trades.len() as f64;
    let total_volume: f64 = trades.iter().map(|t| t.amount).sum();
    let successful = trades
        .iter()
        .filter(|t| t.status == TradeStatus::Success)
        .count() as f64;
    let months: HashSet<(i32, u32)> = trades.iter().map(|t| (t.date.year(), t.date.month())).collect();

    let mut v = [0.0; FEATURE_VECTOR_LEN];
    v[Feature::TransactionCount as usize] = count;
    v[Feature::TotalVolume as usize] = total_volume;
    v[Feature::AverageVolume as usize] = total_volume / count;
    v[Feature::SuccessfulTransactions as usize] = successful;
    v[Feature::TransactionFrequency as usize] = count / months.len() as f64;
    v[Feature::ProfitLossRatio as usize] = calculate_profit_loss(trades);
    v[Feature::DaysSinceLastActivity as usize] = (today - latest).num_days() as f64;

    Ok(FeatureVector(v))
}
