//! Balance sweeper.
//!
//! Drains an ephemeral wallet's whole balance, minus the fee of a plain
//! transfer, to a destination wallet. Retries are driven by
//! [`ChainErrorKind`]; a broadcast whose receipt cannot be confirmed is never
//! retried, since a second broadcast could double-spend.

use std::sync::Arc;
use std::time::Duration;

use ethers::types::{TxHash, U256};
use log::{error, info, warn};

use crate::pools::DestinationAddress;
use crate::runtime::blockchain_adapter::{
    ChainClient, ChainError, ChainErrorKind, ReceiptStatus, TransferRequest, TRANSFER_GAS_LIMIT,
};
use crate::runtime::wallet_manager::EphemeralWallet;
use crate::types::{DelayRange, JobTag};

/// Result of a sweep.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransferOutcome {
    /// Receipt confirmed with success status
    Success { tx_hash: TxHash },
    /// Broadcast accepted, receipt could not be confirmed
    SuccessUnverified { tx_hash: TxHash },
    /// Nothing left to send after fees
    InsufficientFunds,
    Failed { reason: String },
}

impl TransferOutcome {
    /// Both verified and unverified broadcasts count as a successful sweep.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::SuccessUnverified { .. })
    }

    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            Self::Success { tx_hash } | Self::SuccessUnverified { tx_hash } => Some(*tx_hash),
            _ => None,
        }
    }
}

/// Delays and limits for sweeping.
#[derive(Clone, Debug)]
pub struct SweepPolicy {
    pub max_retries: u32,
    /// Pause between broadcast and receipt polling
    pub receipt_settle: Duration,
    pub receipt_timeout: Duration,
    pub nonce_too_low_delay: DelayRange,
    pub underpriced_delay: DelayRange,
    pub not_found_delay: DelayRange,
    pub network_delay: DelayRange,
    /// Used when no error-specific delay applies
    pub retry_delay: DelayRange,
}

impl Default for SweepPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            receipt_settle: Duration::from_secs(2),
            receipt_timeout: Duration::from_secs(30),
            nonce_too_low_delay: DelayRange::fixed(Duration::from_secs(2)),
            underpriced_delay: DelayRange::fixed(Duration::from_secs(2)),
            not_found_delay: DelayRange::fixed(Duration::from_secs(3)),
            network_delay: DelayRange::between_secs(3, 6),
            retry_delay: DelayRange::between_secs(2, 5),
        }
    }
}

impl SweepPolicy {
    /// Same limits, every pause set to zero.
    pub fn without_delays() -> Self {
        Self {
            receipt_settle: Duration::ZERO,
            nonce_too_low_delay: DelayRange::ZERO,
            underpriced_delay: DelayRange::ZERO,
            not_found_delay: DelayRange::ZERO,
            network_delay: DelayRange::ZERO,
            retry_delay: DelayRange::ZERO,
            ..Self::default()
        }
    }
}

/// Fee and amount for a full-balance transfer.
///
/// `None` when the balance does not cover the fee with something left over.
pub fn sweep_amount(balance: U256, gas_price: U256) -> Option<(U256, U256)> {
    let fee = gas_price.checked_mul(U256::from(TRANSFER_GAS_LIMIT))?;
    if balance <= fee {
        return None;
    }
    Some((fee, balance - fee))
}

/// What to do after one attempt.
enum Step {
    Done(TransferOutcome),
    /// Error-specific pause, then next attempt
    RetryAfter(DelayRange),
    /// Generic pause, then next attempt
    Retry,
}

/// Sweeps ephemeral wallets through a [`ChainClient`].
pub struct Sweeper<C> {
    chain: Arc<C>,
    policy: SweepPolicy,
}

impl<C: ChainClient> Sweeper<C> {
    pub fn new(chain: Arc<C>, policy: SweepPolicy) -> Self {
        Self { chain, policy }
    }

    pub fn policy(&self) -> &SweepPolicy {
        &self.policy
    }

    /// Send everything but the fee from `wallet` to `destination`.
    pub async fn sweep(
        &self,
        tag: JobTag,
        wallet: &EphemeralWallet,
        destination: &DestinationAddress,
    ) -> TransferOutcome {
        let max_retries = self.policy.max_retries;

        for attempt in 1..=max_retries {
            let delay = match self.attempt(tag, attempt, wallet, destination).await {
                Step::Done(outcome) => return outcome,
                Step::RetryAfter(delay) => delay,
                Step::Retry => self.policy.retry_delay,
            };

            if attempt < max_retries {
                let pause = delay.sample();
                if !pause.is_zero() {
                    info!("{tag} ⏳ Retrying transfer in {:.1} seconds...", pause.as_secs_f64());
                    tokio::time::sleep(pause).await;
                }
            }
        }

        TransferOutcome::Failed {
            reason: format!("exhausted retries after {} attempts", max_retries),
        }
    }

    async fn attempt(
        &self,
        tag: JobTag,
        attempt: u32,
        wallet: &EphemeralWallet,
        destination: &DestinationAddress,
    ) -> Step {
        // 1. Build and broadcast
        let tx_hash = match self.broadcast(wallet, destination).await {
            Ok(Some(tx_hash)) => tx_hash,
            Ok(None) => return Step::Done(TransferOutcome::InsufficientFunds),
            Err(e) => return self.classify_failure(tag, attempt, e),
        };

        // 2. Confirm
        if !self.policy.receipt_settle.is_zero() {
            tokio::time::sleep(self.policy.receipt_settle).await;
        }
        match self.chain.wait_for_receipt(tx_hash, self.policy.receipt_timeout).await {
            Ok(ReceiptStatus::Success) => Step::Done(TransferOutcome::Success { tx_hash }),
            Ok(ReceiptStatus::Reverted) => {
                warn!("{tag} ⚠️  Attempt {attempt}: Transaction failed (status=0)");
                Step::Retry
            }
            Err(e) => {
                warn!("{tag} ⚠️  Attempt {attempt}: Receipt error → {}", e);
                Step::Done(TransferOutcome::SuccessUnverified { tx_hash })
            }
        }
    }

    /// `Ok(None)` means there is nothing worth sending.
    async fn broadcast(
        &self,
        wallet: &EphemeralWallet,
        destination: &DestinationAddress,
    ) -> Result<Option<TxHash>, ChainError> {
        let from = wallet.address();

        let balance = self.chain.balance(from).await?;
        if balance.is_zero() {
            return Ok(None);
        }

        let gas_price = self.chain.gas_price().await?;
        let Some((_fee, value)) = sweep_amount(balance, gas_price) else {
            return Ok(None);
        };

        let nonce = self.chain.pending_nonce(from).await?;
        let transfer = TransferRequest {
            to: destination.address(),
            value,
            gas_limit: U256::from(TRANSFER_GAS_LIMIT),
            gas_price,
            nonce,
        };

        self.chain.send_transfer(wallet, &transfer).await.map(Some)
    }

    fn classify_failure(&self, tag: JobTag, attempt: u32, err: ChainError) -> Step {
        match err.kind {
            ChainErrorKind::InsufficientFunds => Step::Done(TransferOutcome::InsufficientFunds),
            ChainErrorKind::NonceTooLow => {
                warn!("{tag} ⚠️  Attempt {attempt}: Nonce too low, retrying...");
                Step::RetryAfter(self.policy.nonce_too_low_delay)
            }
            ChainErrorKind::Underpriced => {
                warn!("{tag} ⚠️  Attempt {attempt}: Transaction underpriced, retrying...");
                Step::RetryAfter(self.policy.underpriced_delay)
            }
            ChainErrorKind::NotFound => {
                warn!("{tag} ⚠️  Attempt {attempt}: Transaction not found, retrying...");
                Step::RetryAfter(self.policy.not_found_delay)
            }
            ChainErrorKind::Network | ChainErrorKind::Timeout => {
                warn!("{tag} ⚠️  Attempt {attempt}: Network issue → {}", err.message);
                Step::RetryAfter(self.policy.network_delay)
            }
            ChainErrorKind::Other => {
                error!("{tag} ⚠️  Attempt {attempt}: Unexpected error → {}", err.message);
                Step::Retry
            }
        }
    }
}
