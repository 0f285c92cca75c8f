//! Chain client seam used by the balance poller and the sweeper.
//!
//! Concrete implementations map their transport's failures onto
//! [`ChainErrorKind`] so retry decisions never depend on error text.

use core::fmt;
use std::time::Duration;

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};
use thiserror::Error;

use crate::runtime::wallet_manager::EphemeralWallet;

/// Gas limit of a plain value transfer.
pub const TRANSFER_GAS_LIMIT: u64 = 21_000;

/// Failure categories the sweeper reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChainErrorKind {
    InsufficientFunds,
    NonceTooLow,
    Underpriced,
    NotFound,
    Network,
    Timeout,
    Other,
}

impl ChainErrorKind {
    /// Map a node's error message onto a kind.
    ///
    /// Node implementations (geth, reth, erigon, nitro) share these phrasings for
    /// the conditions we care about.
    pub fn from_rpc_message(message: &str) -> Self {
        let message = message.to_lowercase();
        if message.contains("insufficient funds") {
            Self::InsufficientFunds
        } else if message.contains("nonce too low") {
            Self::NonceTooLow
        } else if message.contains("replacement transaction underpriced") {
            Self::Underpriced
        } else if message.contains("transaction not found") {
            Self::NotFound
        } else if message.contains("timeout") || message.contains("timed out") {
            Self::Timeout
        } else if message.contains("network")
            || message.contains("connection")
            || message.contains("error sending request")
        {
            Self::Network
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for ChainErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InsufficientFunds => "insufficient funds",
            Self::NonceTooLow => "nonce too low",
            Self::Underpriced => "replacement underpriced",
            Self::NotFound => "not found",
            Self::Network => "network",
            Self::Timeout => "timeout",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// A classified chain failure.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ChainError {
    pub kind: ChainErrorKind,
    pub message: String,
}

impl ChainError {
    pub fn new(kind: ChainErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }
}

pub type ChainResult<T> = core::result::Result<T, ChainError>;

/// A fully specified legacy value transfer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferRequest {
    pub to: Address,
    pub value: U256,
    pub gas_limit: U256,
    pub gas_price: U256,
    pub nonce: U256,
}

/// Final status reported by a receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReceiptStatus {
    Success,
    Reverted,
}

/// Operations the core needs from a chain.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Confirmed balance in wei.
    async fn balance(&self, address: Address) -> ChainResult<U256>;

    /// Current gas price in wei.
    async fn gas_price(&self) -> ChainResult<U256>;

    /// Transaction count including pending transactions.
    async fn pending_nonce(&self, address: Address) -> ChainResult<U256>;

    /// Sign `transfer` with `wallet` and broadcast it.
    async fn send_transfer(
        &self,
        wallet: &EphemeralWallet,
        transfer: &TransferRequest,
    ) -> ChainResult<TxHash>;

    /// Wait until a receipt for `tx_hash` exists, failing with `Timeout` after `timeout`.
    async fn wait_for_receipt(&self, tx_hash: TxHash, timeout: Duration)
        -> ChainResult<ReceiptStatus>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rpc_message_classification() {
        let cases = [
            ("insufficient funds for gas * price + value", ChainErrorKind::InsufficientFunds),
            ("Nonce too low: next nonce 4, tx nonce 3", ChainErrorKind::NonceTooLow),
            ("replacement transaction underpriced", ChainErrorKind::Underpriced),
            ("transaction not found", ChainErrorKind::NotFound),
            ("request timed out", ChainErrorKind::Timeout),
            ("error sending request for url", ChainErrorKind::Network),
            ("Connection refused", ChainErrorKind::Network),
            ("execution reverted", ChainErrorKind::Other),
        ];
        for (message, kind) in cases {
            assert_eq!(ChainErrorKind::from_rpc_message(message), kind, "{message}");
        }
    }

    #[test]
    fn test_chain_error_display() {
        let err = ChainError::new(ChainErrorKind::NonceTooLow, "nonce too low: next nonce 4");
        assert_eq!(err.to_string(), "nonce too low: nonce too low: next nonce 4");
    }
}
