//! Error types for faucet harvesting.
//!
//! Provides strongly-typed errors for the pre-flight and loading stages using `thiserror`.
//! Per-job failures never surface here; they are classified into outcomes and logged.

use thiserror::Error;

/// Errors that can occur before or outside of job execution.
#[derive(Debug, Error)]
pub enum FaucetBotError {
    /// Missing or unusable configuration (wallet file, RPC endpoint, run parameters)
    #[error("Configuration error: {reason}")]
    Config {
        reason: String,
    },
    /// Invalid input parameters
    #[error("Invalid input: {reason}")]
    InvalidInput {
        reason: String,
    },
    /// Network/RPC error
    #[error("Network error: {reason}")]
    NetworkError {
        reason: String,
    },
    /// Key derivation or signing failed
    #[error("Crypto error: {reason}")]
    CryptoError {
        reason: String,
    },
    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for faucet harvesting operations.
pub type Result<T> = core::result::Result<T, FaucetBotError>;
