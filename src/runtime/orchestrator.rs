//! Job orchestrator.
//!
//! One job: generate wallet → pick destination → request faucet → poll balance → sweep.
//! The caller only sees success or failure; every intermediate detail is logged.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::types::{TxHash, U256};
use ethers::utils::format_ether;
use log::{error, info, warn};

use crate::faucet::{FaucetOutcome, FundingSource};
use crate::pools::DestinationPool;
use crate::runtime::blockchain_adapter::ChainClient;
use crate::runtime::sweeper::{Sweeper, TransferOutcome};
use crate::runtime::wallet_manager::EphemeralWallet;
use crate::runtime::worker_pool::JobRunner;
use crate::types::{DelayRange, JobTag};

/// Default explorer prefix for transaction links.
pub const DEFAULT_EXPLORER_TX_URL: &str = "https://testnet.explorer.intuition.systems/tx/";

/// Default native token symbol used in balance log lines.
pub const DEFAULT_TOKEN_SYMBOL: &str = "tTRUST";

/// Terminal state of a job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobState {
    /// Destination pool was empty
    NoDestination,
    FaucetFailed(FaucetOutcome),
    /// Faucet reported success but the balance never arrived
    BalanceZero,
    Swept(TransferOutcome),
    SweepFailed(TransferOutcome),
}

impl JobState {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Swept(_))
    }
}

/// Waits, polling budget and display settings for a job.
#[derive(Clone, Debug)]
pub struct JobSettings {
    /// Pause after a successful faucet request before the first balance read
    pub settle_delay: DelayRange,
    pub balance_polls: u32,
    pub poll_interval: Duration,
    pub explorer_tx_url: String,
    pub token_symbol: String,
}

impl Default for JobSettings {
    fn default() -> Self {
        Self {
            settle_delay: DelayRange::between_secs(5, 10),
            balance_polls: 3,
            poll_interval: Duration::from_secs(5),
            explorer_tx_url: DEFAULT_EXPLORER_TX_URL.to_string(),
            token_symbol: DEFAULT_TOKEN_SYMBOL.to_string(),
        }
    }
}

/// Runs complete harvesting jobs.
pub struct JobOrchestrator<C, F> {
    chain: Arc<C>,
    faucet: F,
    sweeper: Sweeper<C>,
    destinations: Arc<DestinationPool>,
    settings: JobSettings,
}

impl<C: ChainClient, F: FundingSource> JobOrchestrator<C, F> {
    pub fn new(
        chain: Arc<C>,
        faucet: F,
        sweeper: Sweeper<C>,
        destinations: Arc<DestinationPool>,
        settings: JobSettings,
    ) -> Self {
        Self { chain, faucet, sweeper, destinations, settings }
    }

    /// Run one job to its terminal state.
    pub async fn execute(&self, tag: JobTag) -> JobState {
        let Some(destination) = self.destinations.pick() else {
            error!("{tag} ❌ No destination wallet available!");
            return JobState::NoDestination;
        };

        info!("{tag} 🚀 Starting job...");
        // Dropped (and wiped) when this function returns, on every path.
        let wallet = EphemeralWallet::generate();
        info!("{tag} 🔑 From Address: {}", wallet.checksum_address());
        info!("{tag} 🎯 To Address: {}", destination);

        // 1. Faucet
        info!("{tag} 💧 Requesting faucet...");
        match self.faucet.request_funds(tag, wallet.address()).await {
            FaucetOutcome::Success { tx_hash } => {
                info!("{tag} ✅ Faucet Requested Successfully!");
                if let Some(tx_hash) = tx_hash {
                    info!("{tag} 📝 Explorer: {}{}", self.settings.explorer_tx_url, tx_hash);
                }
            }
            FaucetOutcome::RateLimited { message } => {
                error!("{tag} ❌ Request Faucet FAILED: Rate limited: {message}");
                return JobState::FaucetFailed(FaucetOutcome::RateLimited { message });
            }
            other => {
                error!("{tag} ❌ Request Faucet FAILED: {}", describe_faucet_failure(&other));
                return JobState::FaucetFailed(other);
            }
        }

        // 2. Balance
        let settle = self.settings.settle_delay.sample();
        if !settle.is_zero() {
            info!("{tag} ⏳ Waiting {}s to check balance...", settle.as_secs());
            tokio::time::sleep(settle).await;
        }
        let balance = self.poll_balance(tag, &wallet).await;
        info!(
            "{tag} 💰 Balance: {} {}",
            format_ether(balance),
            self.settings.token_symbol
        );
        if balance.is_zero() {
            error!(
                "{tag} ❌ Balance still 0 after {} attempts, skipping transfer",
                self.settings.balance_polls
            );
            return JobState::BalanceZero;
        }

        // 3. Sweep
        info!("{tag} 📤 Transferring to {}...", destination.short());
        let outcome = self.sweeper.sweep(tag, &wallet, destination).await;
        match &outcome {
            TransferOutcome::Success { tx_hash } => {
                info!("{tag} 🎉 Faucet Transferred Successfully!");
                info!("{tag} 📝 Explorer: {}", self.explorer_link(tx_hash));
            }
            TransferOutcome::SuccessUnverified { tx_hash } => {
                warn!("{tag} 🎉 Faucet Transferred (receipt unverified)");
                info!("{tag} 📝 Explorer: {}", self.explorer_link(tx_hash));
            }
            TransferOutcome::InsufficientFunds => {
                error!("{tag} ❌ Transfer Faucet failed: Insufficient funds for gas");
            }
            TransferOutcome::Failed { reason } => {
                error!("{tag} ❌ Transfer Faucet failed: {reason}");
            }
        }

        if outcome.is_success() {
            JobState::Swept(outcome)
        } else {
            JobState::SweepFailed(outcome)
        }
    }

    /// Read the balance until it is non-zero or the polling budget runs out.
    async fn poll_balance(&self, tag: JobTag, wallet: &EphemeralWallet) -> U256 {
        let polls = self.settings.balance_polls;
        for attempt in 1..=polls {
            let read_failed = match self.chain.balance(wallet.address()).await {
                Ok(balance) if !balance.is_zero() => return balance,
                Ok(_) => false,
                Err(e) => {
                    warn!("{tag} ⚠️  Balance read failed: {e}");
                    true
                }
            };
            if attempt < polls {
                warn!(
                    "{tag} ⚠️  {}",
                    poll_retry_notice(read_failed, attempt, polls, self.settings.poll_interval)
                );
                tokio::time::sleep(self.settings.poll_interval).await;
            }
        }
        U256::zero()
    }

    fn explorer_link(&self, tx_hash: &TxHash) -> String {
        format!("{}0x{}", self.settings.explorer_tx_url, hex::encode(tx_hash.as_bytes()))
    }
}

#[async_trait]
impl<C, F> JobRunner for JobOrchestrator<C, F>
where
    C: ChainClient + 'static,
    F: FundingSource + 'static,
{
    async fn run(&self, tag: JobTag) -> bool {
        let state = self.execute(tag).await;
        if !state.is_success() {
            error!("{tag} ❌ Job completed with failure");
        }
        state.is_success()
    }
}

fn poll_retry_notice(read_failed: bool, attempt: u32, polls: u32, interval: Duration) -> String {
    let what = if read_failed { "Balance unavailable" } else { "Balance still 0" };
    format!("{what} (attempt {attempt}/{polls}), retrying in {}s...", interval.as_secs())
}

fn describe_faucet_failure(outcome: &FaucetOutcome) -> String {
    match outcome {
        FaucetOutcome::Fail { message } => message.clone(),
        FaucetOutcome::ServerError { message, code } => match code {
            Some(code) => format!("{message} (code={code})"),
            None => message.clone(),
        },
        FaucetOutcome::Invalid { .. } => "invalid response".to_string(),
        FaucetOutcome::NetworkError { message } => message.clone(),
        FaucetOutcome::Success { .. } | FaucetOutcome::RateLimited { .. } => String::new(),
    }
}
