// src/mentions.rs
use serde::Serialize;
use tracing::info;

use crate::address::extract_wallet_address;
use crate::aggregator::WalletAggregator;
use crate::models::WalletSummary;
use crate::rpc::Transport;

pub const NO_ADDRESS_ERROR: &str = "No valid wallet address found.";

/// What the social surface gets back for one message
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MentionReply {
    Summary(Box<WalletSummary>),
    NoAddress { error: String },
}

/// Summarize the first wallet address mentioned in `text`
pub async fn respond_to_mention<T: Transport>(
    aggregator: &WalletAggregator<T>,
    text: &str,
) -> MentionReply {
    match extract_wallet_address(text) {
        Some(address) => {
            info!("Mention references wallet {}", address);
            MentionReply::Summary(Box::new(aggregator.generate_summary(&address).await))
        }
        None => MentionReply::NoAddress {
            error: NO_ADDRESS_ERROR.to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ChainClient;
    use crate::rpc::mock::MockTransport;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn mention_without_address() {
        let agg = WalletAggregator::new(ChainClient::new(MockTransport::new(|_, _| Ok(Value::Null))));
        let reply = respond_to_mention(&agg, "what do you think about SOL?").await;

        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({ "error": "No valid wallet address found." })
        );
        assert!(agg.client().transport().calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn mention_with_address_is_summarized() {
        let agg = WalletAggregator::new(ChainClient::new(MockTransport::new(|_, _| Ok(Value::Null))));
        let reply = respond_to_mention(
            &agg,
            "@bot check this wallet 7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU thanks",
        )
        .await;

        match reply {
            MentionReply::Summary(summary) => {
                assert_eq!(summary.wallet_address, "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU")
            }
            other => panic!("expected a summary, got {:?}", other),
        }
    }
}
