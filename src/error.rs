// src/error.rs
use thiserror::Error;

/// Failure talking to the chain RPC endpoint
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TransportError {
    #[error("RPC request timed out")]
    Timeout,

    #[error("RPC connection failed: {0}")]
    Network(String),

    #[error("RPC error: HTTP {0}")]
    Status(u16),

    #[error("Malformed RPC response: {0}")]
    Malformed(String),

    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
}

impl TransportError {
    /// Worth another attempt: the node may answer next time
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Timeout | TransportError::Network(_) => true,
            TransportError::Status(code) => *code == 429 || *code >= 500,
            TransportError::Malformed(_) | TransportError::Rpc { .. } => false,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout
        } else if e.is_decode() {
            TransportError::Malformed(e.to_string())
        } else if let Some(status) = e.status() {
            TransportError::Status(status.as_u16())
        } else {
            TransportError::Network(e.to_string())
        }
    }
}

/// Feature extraction cannot produce a full vector from the given history
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FeatureError {
    #[error("insufficient data: at least one transaction is required")]
    InsufficientData,

    #[error("malformed transaction record at index {index}: {reason}")]
    MalformedInput { index: usize, reason: String },
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum AddressError {
    #[error("invalid wallet address length {0} (expected 32-44)")]
    Length(usize),

    #[error("invalid wallet address character {0:?}")]
    Character(char),
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ScoringError {
    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error("scoring model returned {0}, expected a value in [0, 1]")]
    ScoreOutOfRange(f64),
}
