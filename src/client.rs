// src/client.rs
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

use crate::error::TransportError;
use crate::models::{
    lamports_to_sol, Balance, PerformanceSample, ProgramAccount, SignatureInfo, TokenAmount,
};
use crate::parser::{self, RawTokenAmount, RawTransaction, WithContext};
use crate::rpc::Transport;

/// SPL token program
pub const TOKEN_PROGRAM_ID: &str = "TokenkegQfeZyiNwAJbNbGKPFXCWuBvf9Ss623VQ5DA";

/// Typed chain queries, one RPC call each. Null results decode to the
/// operation's zero value, results of the wrong shape are
/// `TransportError::Malformed`; transport errors pass through untouched.
pub struct ChainClient<T> {
    transport: T,
    deadline: Option<Duration>,
}

impl<T: Transport> ChainClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            deadline: None,
        }
    }

    /// Bound every query to `deadline`; expiry fails it with `TransportError::Timeout`
    pub fn with_deadline(mut self, deadline: Option<Duration>) -> Self {
        self.deadline = deadline;
        self
    }

    #[cfg(test)]
    pub(crate) fn transport(&self) -> &T {
        &self.transport
    }

    async fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let fut = self.transport.send(method, params);
        match self.deadline {
            Some(limit) => tokio::time::timeout(limit, fut).await.map_err(|_| {
                debug!("{} exceeded deadline of {:?}", method, limit);
                TransportError::Timeout
            })?,
            None => fut.await,
        }
    }

    /// Native balance in SOL
    pub async fn get_balance(&self, address: &str) -> Result<Balance, TransportError> {
        let result = self.call("getBalance", vec![json!(address)]).await?;
        let lamports: WithContext<u64> = parser::decode_result(result)?;
        Ok(lamports_to_sol(lamports.value))
    }

    /// Most recent signatures first, as returned by the node
    pub async fn get_signatures_for_address(
        &self,
        address: &str,
        limit: usize,
    ) -> Result<Vec<SignatureInfo>, TransportError> {
        let result = self
            .call(
                "getSignaturesForAddress",
                vec![json!(address), json!({ "limit": limit })],
            )
            .await?;
        parser::decode_signatures(result)
    }

    pub async fn get_transaction(
        &self,
        signature: &str,
    ) -> Result<Option<RawTransaction>, TransportError> {
        let result = self
            .call(
                "getTransaction",
                vec![
                    json!(signature),
                    json!({ "encoding": "json", "maxSupportedTransactionVersion": 0 }),
                ],
            )
            .await?;
        if result.is_null() {
            return Ok(None);
        }
        Ok(Some(parser::decode_result(result)?))
    }

    /// Raw keyed token accounts owned by `address` under the SPL token program
    pub async fn get_token_accounts_by_owner(
        &self,
        address: &str,
    ) -> Result<Vec<Value>, TransportError> {
        let result = self
            .call(
                "getTokenAccountsByOwner",
                vec![
                    json!(address),
                    json!({ "programId": TOKEN_PROGRAM_ID }),
                    json!({ "encoding": "jsonParsed" }),
                ],
            )
            .await?;
        let accounts: WithContext<Vec<Value>> = parser::decode_result(result)?;
        Ok(accounts.value)
    }

    pub async fn get_token_account_balance(
        &self,
        token_account: &str,
    ) -> Result<Option<TokenAmount>, TransportError> {
        let result = self
            .call("getTokenAccountBalance", vec![json!(token_account)])
            .await?;
        let amount: WithContext<Option<RawTokenAmount>> = parser::decode_result(result)?;
        Ok(amount.value.and_then(RawTokenAmount::into_token_amount))
    }

    /// Unix timestamp of `slot`, if the node still has it
    pub async fn get_block_time(&self, slot: u64) -> Result<Option<i64>, TransportError> {
        let result = self.call("getBlockTime", vec![json!(slot)]).await?;
        parser::decode_result(result)
    }

    pub async fn get_program_accounts(
        &self,
        program_id: &str,
    ) -> Result<Vec<ProgramAccount>, TransportError> {
        let result = self
            .call(
                "getProgramAccounts",
                vec![json!(program_id), json!({ "encoding": "base64" })],
            )
            .await?;
        parser::decode_program_accounts(result)
    }

    pub async fn get_slot(&self) -> Result<Option<u64>, TransportError> {
        let result = self.call("getSlot", vec![]).await?;
        parser::decode_result(result)
    }

    pub async fn get_recent_performance_samples(
        &self,
    ) -> Result<Vec<PerformanceSample>, TransportError> {
        let result = self.call("getRecentPerformanceSamples", vec![]).await?;
        parser::decode_performance_samples(result)
    }

    /// Rent-exempt minimum in SOL for an account of `data_len` bytes
    pub async fn get_minimum_balance_for_rent_exemption(
        &self,
        data_len: usize,
    ) -> Result<Option<Balance>, TransportError> {
        let result = self
            .call("getMinimumBalanceForRentExemption", vec![json!(data_len)])
            .await?;
        let lamports: Option<u64> = parser::decode_result(result)?;
        Ok(lamports.map(lamports_to_sol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::MockTransport;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    const WALLET: &str = "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU";

    #[tokio::test]
    async fn balance_converts_lamports() {
        let client = ChainClient::new(MockTransport::new(|_, _| {
            Ok(json!({ "context": { "slot": 1 }, "value": 2_500_000_000u64 }))
        }));
        assert_eq!(
            client.get_balance(WALLET).await,
            Ok(Decimal::from_str("2.5").unwrap())
        );
    }

    #[tokio::test]
    async fn null_results_become_zero_values() {
        let client = ChainClient::new(MockTransport::new(|_, _| Ok(Value::Null)));

        assert_eq!(client.get_balance(WALLET).await, Ok(Decimal::ZERO));
        assert_eq!(client.get_signatures_for_address(WALLET, 10).await, Ok(vec![]));
        assert!(client.get_transaction("sig").await.unwrap().is_none());
        assert_eq!(client.get_token_accounts_by_owner(WALLET).await, Ok(vec![]));
        assert_eq!(client.get_token_account_balance("acct").await, Ok(None));
        assert_eq!(client.get_block_time(5).await, Ok(None));
        assert_eq!(client.get_program_accounts(TOKEN_PROGRAM_ID).await, Ok(vec![]));
        assert_eq!(client.get_slot().await, Ok(None));
        assert_eq!(client.get_recent_performance_samples().await, Ok(vec![]));
        assert_eq!(client.get_minimum_balance_for_rent_exemption(0).await, Ok(None));
    }

    #[tokio::test]
    async fn wrong_shaped_results_are_malformed() {
        let client = ChainClient::new(MockTransport::new(|method, _| match method {
            "getBalance" => Ok(json!({ "context": { "slot": 1 }, "value": "12345000000000" })),
            "getSignaturesForAddress" => Ok(json!({ "unexpected": "object" })),
            "getTransaction" => Ok(json!("not a transaction")),
            "getTokenAccountsByOwner" => Ok(json!({ "value": 3 })),
            "getBlockTime" => Ok(json!("yesterday")),
            "getProgramAccounts" => Ok(json!(7)),
            "getSlot" => Ok(json!(-1)),
            "getRecentPerformanceSamples" => Ok(json!({})),
            "getTokenAccountBalance" => Ok(json!({ "value": { "decimals": "six" } })),
            _ => Ok(json!("lots")),
        }));

        let malformed = |r: Result<(), TransportError>| matches!(r, Err(TransportError::Malformed(_)));
        assert!(malformed(client.get_balance(WALLET).await.map(drop)));
        assert!(malformed(client.get_signatures_for_address(WALLET, 10).await.map(drop)));
        assert!(malformed(client.get_transaction("sig").await.map(drop)));
        assert!(malformed(client.get_token_accounts_by_owner(WALLET).await.map(drop)));
        assert!(malformed(client.get_token_account_balance("acct").await.map(drop)));
        assert!(malformed(client.get_block_time(5).await.map(drop)));
        assert!(malformed(client.get_program_accounts(TOKEN_PROGRAM_ID).await.map(drop)));
        assert!(malformed(client.get_slot().await.map(drop)));
        assert!(malformed(client.get_recent_performance_samples().await.map(drop)));
        assert!(malformed(client.get_minimum_balance_for_rent_exemption(0).await.map(drop)));
    }

    #[tokio::test]
    async fn builds_method_specific_params() {
        let transport = MockTransport::new(|_, _| Ok(Value::Null));
        let client = ChainClient::new(transport);

        client.get_signatures_for_address(WALLET, 25).await.unwrap();
        client.get_token_accounts_by_owner(WALLET).await.unwrap();

        let sig_calls = client.transport.calls_to("getSignaturesForAddress");
        assert_eq!(sig_calls, vec![vec![json!(WALLET), json!({ "limit": 25 })]]);

        let token_calls = client.transport.calls_to("getTokenAccountsByOwner");
        assert_eq!(token_calls[0][1], json!({ "programId": TOKEN_PROGRAM_ID }));
        assert_eq!(token_calls[0][2], json!({ "encoding": "jsonParsed" }));
    }

    #[tokio::test]
    async fn transport_errors_propagate_unchanged() {
        let client = ChainClient::new(MockTransport::new(|_, _| {
            Err(TransportError::Rpc {
                code: -32009,
                message: "Slot skipped".to_string(),
            })
        }));
        assert_eq!(
            client.get_block_time(12).await,
            Err(TransportError::Rpc {
                code: -32009,
                message: "Slot skipped".to_string()
            })
        );
        assert_eq!(client.transport.calls_to("getBlockTime").len(), 1);
    }

    #[tokio::test]
    async fn deadline_expiry_is_a_timeout() {
        let transport = MockTransport::new(|_, _| Ok(json!(9)))
            .with_delay(|_, _| Duration::from_millis(500));
        let client = ChainClient::new(transport).with_deadline(Some(Duration::from_millis(20)));

        assert_eq!(client.get_slot().await, Err(TransportError::Timeout));
    }

    #[tokio::test]
    async fn token_account_balance_and_rent() {
        let client = ChainClient::new(MockTransport::new(|method, _| match method {
            "getTokenAccountBalance" => Ok(json!({
                "context": { "slot": 1 },
                "value": { "amount": "1234500", "decimals": 4, "uiAmount": 123.45, "uiAmountString": "123.45" }
            })),
            "getMinimumBalanceForRentExemption" => Ok(json!(2_039_280u64)),
            _ => Ok(Value::Null),
        }));

        let amount = client.get_token_account_balance("acct").await.unwrap().unwrap();
        assert_eq!(amount.decimals, 4);
        assert_eq!(amount.ui_amount, Decimal::from_str("123.45").unwrap());
        assert_eq!(amount.amount.as_deref(), Some("1234500"));

        assert_eq!(
            client.get_minimum_balance_for_rent_exemption(165).await,
            Ok(Some(Decimal::from_str("0.00203928").unwrap()))
        );
    }
}
