// src/parser.rs
//! Typed decoding of raw RPC results. Every field is optional on the wire and
//! falls back to a fixed value instead of failing the whole decode.
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::str::FromStr;
use tracing::debug;

use crate::error::TransportError;
use crate::models::{
    lamports_to_sol, PerformanceSample, ProgramAccount, SignatureInfo, TokenAmount, TokenHolding,
    TransactionRecord,
};

/// Token decimals beyond this are treated as unparseable metadata
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Decode `value` as `T`, or `T::default()` when null / wrong shape.
/// Only for pieces nested inside an already accepted result.
pub fn decode_or_default<T: DeserializeOwned + Default>(value: Value) -> T {
    if value.is_null() {
        return T::default();
    }
    serde_json::from_value(value).unwrap_or_else(|e| {
        debug!("Falling back to default on undecodable result: {}", e);
        T::default()
    })
}

/// Decode a whole RPC result. Null is `T::default()`; a result of the wrong
/// shape is `TransportError::Malformed`, never a silent zero.
pub fn decode_result<T: DeserializeOwned + Default>(value: Value) -> Result<T, TransportError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| TransportError::Malformed(e.to_string()))
}

/// Decode each array element independently, dropping the ones that don't fit.
/// Null is an empty list; anything other than an array is malformed.
pub fn decode_each<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, TransportError> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        other => Err(TransportError::Malformed(format!(
            "expected an array result, got {}",
            other
        ))),
    }
}

/// `{ context, value }` wrapper used by most account queries
#[derive(Debug, Default, Deserialize)]
pub struct WithContext<T> {
    #[serde(default)]
    pub value: T,
}

// ---------- signatures ----------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawSignature {
    signature: String,
    #[serde(default)]
    slot: u64,
    #[serde(default)]
    err: Option<Value>,
    #[serde(default)]
    block_time: Option<i64>,
}

pub fn decode_signatures(value: Value) -> Result<Vec<SignatureInfo>, TransportError> {
    Ok(decode_each::<RawSignature>(value)?
        .into_iter()
        .map(|s| SignatureInfo {
            signature: s.signature,
            slot: s.slot,
            block_time: s.block_time,
            failed: s.err.is_some(),
        })
        .collect())
}

// ---------- transaction detail ----------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTransaction {
    pub slot: Option<u64>,
    pub block_time: Option<i64>,
    pub meta: Option<RawMeta>,
    pub transaction: Option<RawTransactionBody>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMeta {
    pub err: Option<Value>,
    pub fee: u64,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RawTransactionBody {
    pub message: RawMessage,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMessage {
    pub account_keys: Vec<Value>, // plain strings, or objects under jsonParsed
}

impl RawMessage {
    fn position_of(&self, wallet: &str) -> Option<usize> {
        self.account_keys.iter().position(|key| match key {
            Value::String(s) => s == wallet,
            Value::Object(o) => o.get("pubkey").and_then(Value::as_str) == Some(wallet),
            _ => false,
        })
    }
}

/// Join a signature entry with its detail. A missing detail or missing `meta`
/// yields a failed, zero-fee record.
pub fn decode_transaction_record(
    entry: &SignatureInfo,
    detail: Option<RawTransaction>,
    wallet: &str,
) -> TransactionRecord {
    let detail = detail.unwrap_or_default();

    let balance_change = match (&detail.meta, &detail.transaction) {
        (Some(meta), Some(body)) => body
            .message
            .position_of(wallet)
            .and_then(|i| Some((*meta.pre_balances.get(i)?, *meta.post_balances.get(i)?)))
            .map(|(pre, post)| lamports_to_sol(pre.abs_diff(post)))
            .unwrap_or(Decimal::ZERO),
        _ => Decimal::ZERO,
    };

    let (succeeded, fee) = match &detail.meta {
        Some(meta) => (meta.err.is_none(), lamports_to_sol(meta.fee)),
        None => (false, Decimal::ZERO),
    };

    TransactionRecord {
        signature: entry.signature.clone(),
        slot: detail.slot.unwrap_or(entry.slot),
        block_time: detail.block_time.or(entry.block_time),
        succeeded,
        fee,
        balance_change,
    }
}

// ---------- token accounts ----------

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawTokenAmount {
    pub amount: Option<String>,
    pub decimals: Option<u8>,
    pub ui_amount: Option<f64>,
    pub ui_amount_string: Option<String>,
}

impl RawTokenAmount {
    fn ui_decimal(&self) -> Option<Decimal> {
        self.ui_amount_string
            .as_deref()
            .and_then(|s| Decimal::from_str(s).ok())
            .or_else(|| self.ui_amount.and_then(Decimal::from_f64))
    }

    pub fn into_token_amount(self) -> Option<TokenAmount> {
        let decimals = self.decimals.filter(|d| *d <= MAX_TOKEN_DECIMALS)?;
        Some(TokenAmount {
            ui_amount: self.ui_decimal()?,
            amount: self.amount,
            decimals,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct RawTokenInfo {
    mint: Option<String>,
    token_amount: Option<RawTokenAmount>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawKeyedAccount {
    pubkey: Option<String>,
    account: Value,
}

/// One `getTokenAccountsByOwner` entry → holding; never fails
pub fn decode_token_holding(value: Value) -> TokenHolding {
    let keyed: RawKeyedAccount = decode_or_default(value);
    let info: RawTokenInfo = keyed
        .account
        .pointer("/data/parsed/info")
        .cloned()
        .map(decode_or_default)
        .unwrap_or_default();

    let Some(amount) = info.token_amount.and_then(RawTokenAmount::into_token_amount) else {
        return TokenHolding::empty(keyed.pubkey, info.mint);
    };

    let scale = Decimal::from(10u64.pow(amount.decimals as u32));
    let balance_in_base_units = amount
        .ui_amount
        .checked_mul(scale)
        .or_else(|| amount.amount.as_deref().and_then(|a| Decimal::from_str(a).ok()))
        .unwrap_or(Decimal::ZERO);

    TokenHolding {
        account: keyed.pubkey,
        token_address: info.mint,
        decimals: amount.decimals,
        balance: amount.ui_amount,
        balance_in_base_units,
    }
}

// ---------- program accounts / samples ----------

#[derive(Debug, Deserialize)]
struct RawProgramAccount {
    pubkey: String,
    #[serde(default)]
    account: RawAccountInfo,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawAccountInfo {
    lamports: u64,
    owner: Option<String>,
    executable: bool,
}

pub fn decode_program_accounts(value: Value) -> Result<Vec<ProgramAccount>, TransportError> {
    Ok(decode_each::<RawProgramAccount>(value)?
        .into_iter()
        .map(|a| ProgramAccount {
            pubkey: a.pubkey,
            owner: a.account.owner,
            lamports: lamports_to_sol(a.account.lamports),
            executable: a.account.executable,
        })
        .collect())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPerformanceSample {
    slot: u64,
    #[serde(default)]
    num_transactions: u64,
    #[serde(default)]
    num_slots: u64,
    #[serde(default)]
    sample_period_secs: u64,
}

pub fn decode_performance_samples(value: Value) -> Result<Vec<PerformanceSample>, TransportError> {
    Ok(decode_each::<RawPerformanceSample>(value)?
        .into_iter()
        .map(|s| PerformanceSample {
            slot: s.slot,
            num_transactions: s.num_transactions,
            num_slots: s.num_slots,
            sample_period_secs: s.sample_period_secs,
        })
        .collect())
}
