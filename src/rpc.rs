// src/rpc.rs
use async_trait::async_trait;
use backoff::{future::retry, ExponentialBackoff};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{sync::Arc, time::Duration};
use tracing::{debug, warn};

use crate::error::TransportError;

/// Sends one JSON-RPC request and hands back its `result` (or `Value::Null` when absent).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        (**self).send(method, params).await
    }
}

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
}

/// Decode a response body; a top-level `error` wins over any `result`
pub(crate) fn decode_envelope(text: &str) -> Result<Value, TransportError> {
    let parsed: RpcResponse =
        serde_json::from_str(text).map_err(|e| TransportError::Malformed(e.to_string()))?;

    match parsed.error {
        Some(err) => Err(TransportError::Rpc {
            code: err.code,
            message: err.message,
        }),
        None => Ok(parsed.result),
    }
}

/// Plain HTTP POST transport, one attempt per call
pub struct HttpTransport {
    client: Client,
    rpc_url: String,
}

impl HttpTransport {
    pub fn new(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let payload = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params
        });

        debug!("📡 Sending {} → {}", method, self.rpc_url);

        let resp = self.client.post(&self.rpc_url).json(&payload).send().await?;
        if !resp.status().is_success() {
            return Err(TransportError::Status(resp.status().as_u16()));
        }

        let text = resp.text().await?;
        debug!("📩 Raw {} response: {} bytes", method, text.len());

        decode_envelope(&text)
    }
}

/// Exponential-backoff retry over another transport.
///
/// Only transient failures (network, timeout, 429/5xx) are retried; RPC error
/// objects and malformed bodies are returned on the first attempt.
pub struct RetryTransport<T> {
    inner: T,
    initial_interval: Duration,
    max_elapsed: Duration,
}

impl<T: Transport> RetryTransport<T> {
    pub fn new(inner: T, initial_interval: Duration, max_elapsed: Duration) -> Self {
        Self {
            inner,
            initial_interval,
            max_elapsed,
        }
    }

    fn policy(&self) -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: self.initial_interval,
            max_interval: self.initial_interval * 8,
            max_elapsed_time: Some(self.max_elapsed),
            ..Default::default()
        }
    }
}

#[async_trait]
impl<T: Transport> Transport for RetryTransport<T> {
    async fn send(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        retry(self.policy(), || {
            let params = params.clone();
            async move {
                match self.inner.send(method, params).await {
                    Ok(result) => Ok(result),
                    Err(e) if e.is_transient() => {
                        warn!("Retryable RPC error on {}: {}", method, e);
                        Err(backoff::Error::transient(e))
                    }
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            }
        })
        .await
    }
}
