//! Error types for the wallet transaction layer

use thiserror::Error;

/// Main error type for transaction construction, signing and broadcast
#[derive(Error, Debug)]
pub enum WalletError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("SDK error: {0}")]
    Sdk(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Fee estimation error: {0}")]
    FeeEstimation(String),

    #[error("Signing error: {0}")]
    Signing(String),

    #[error("Key derivation error for account {account_index}: {message}")]
    KeyDerivation { account_index: u64, message: String },

    #[error("Transaction rejected: {reason}")]
    BroadcastRejected { reason: String },

    #[error("post condition error: broadcast returned txid {actual}, expected {expected}")]
    TxIdMismatch { expected: String, actual: String },

    #[error("Unsupported tx type: {0}")]
    UnsupportedPayload(String),

    #[error("Malformed nonce in pending transaction {tx_id}: {value}")]
    MalformedNonce { tx_id: String, value: String },

    #[error("Nonce overflow: pending nonce {max_pending} has no successor")]
    NonceOverflow { max_pending: u64 },

    #[error("Fee overflow: {fee} x {multiplier} exceeds u64")]
    FeeOverflow { fee: u64, multiplier: String },

    #[error("Invalid fee multiplier: {0}")]
    InvalidFeeMultiplier(String),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    #[error("Invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

impl WalletError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            WalletError::Network(_) | WalletError::FeeEstimation(_)
        )
    }

    /// Check if error indicates the broadcast result cannot be trusted
    pub fn is_integrity_failure(&self) -> bool {
        matches!(self, WalletError::TxIdMismatch { .. })
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;
