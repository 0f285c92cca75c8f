//! In-memory chain and faucet doubles shared by the integration tests.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use ethers::types::{Address, TxHash, U256};

use faucet_harvest::faucet::{FaucetOutcome, FundingSource};
use faucet_harvest::pools::{DestinationAddress, DestinationPool};
use faucet_harvest::runtime::{
    ChainClient, ChainError, ChainErrorKind, ChainResult, EphemeralWallet, JobSettings,
    ReceiptStatus, TransferRequest,
};
use faucet_harvest::{DelayRange, JobTag};

pub const DEST: &str = "0xABCDEF0123456789ABCDEF0123456789ABCDEF01";

pub fn gwei(n: u64) -> U256 {
    U256::from(n) * U256::exp10(9)
}

pub fn destination() -> DestinationAddress {
    DestinationAddress::parse(DEST).unwrap()
}

pub fn destinations() -> Arc<DestinationPool> {
    Arc::new(std::iter::once(destination()).collect())
}

pub fn tag() -> JobTag {
    JobTag::new(1, 1)
}

pub fn instant_settings() -> JobSettings {
    JobSettings {
        settle_delay: DelayRange::ZERO,
        poll_interval: Duration::ZERO,
        ..JobSettings::default()
    }
}

/// Scripted chain. Each queue is consumed front to back; when a queue runs dry
/// the fallback value is used.
pub struct MockChain {
    balances: Mutex<VecDeque<ChainResult<U256>>>,
    fallback_balance: U256,
    gas_price: U256,
    nonce: U256,
    send_results: Mutex<VecDeque<ChainResult<TxHash>>>,
    receipts: Mutex<VecDeque<ChainResult<ReceiptStatus>>>,
    pub sent: Mutex<Vec<TransferRequest>>,
    pub balance_calls: AtomicUsize,
}

impl MockChain {
    pub fn new(balance: U256, gas_price: U256) -> Self {
        Self {
            balances: Mutex::new(VecDeque::new()),
            fallback_balance: balance,
            gas_price,
            nonce: U256::zero(),
            send_results: Mutex::new(VecDeque::new()),
            receipts: Mutex::new(VecDeque::new()),
            sent: Mutex::new(Vec::new()),
            balance_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_nonce(mut self, nonce: u64) -> Self {
        self.nonce = U256::from(nonce);
        self
    }

    pub fn then_balance(self, balance: ChainResult<U256>) -> Self {
        self.balances.lock().unwrap().push_back(balance);
        self
    }

    pub fn then_send(self, result: ChainResult<TxHash>) -> Self {
        self.send_results.lock().unwrap().push_back(result);
        self
    }

    pub fn then_receipt(self, result: ChainResult<ReceiptStatus>) -> Self {
        self.receipts.lock().unwrap().push_back(result);
        self
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }

    pub fn balance_calls(&self) -> usize {
        self.balance_calls.load(Ordering::SeqCst)
    }
}

pub fn chain_err(kind: ChainErrorKind) -> ChainError {
    ChainError::new(kind, format!("mock {kind}"))
}

#[async_trait]
impl ChainClient for MockChain {
    async fn balance(&self, _address: Address) -> ChainResult<U256> {
        self.balance_calls.fetch_add(1, Ordering::SeqCst);
        self.balances
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(self.fallback_balance))
    }

    async fn gas_price(&self) -> ChainResult<U256> {
        Ok(self.gas_price)
    }

    async fn pending_nonce(&self, _address: Address) -> ChainResult<U256> {
        Ok(self.nonce)
    }

    async fn send_transfer(
        &self,
        _wallet: &EphemeralWallet,
        transfer: &TransferRequest,
    ) -> ChainResult<TxHash> {
        let mut sent = self.sent.lock().unwrap();
        sent.push(transfer.clone());
        let fallback = TxHash::from_low_u64_be(sent.len() as u64);
        self.send_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(fallback))
    }

    async fn wait_for_receipt(
        &self,
        _tx_hash: TxHash,
        _timeout: Duration,
    ) -> ChainResult<ReceiptStatus> {
        self.receipts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(ReceiptStatus::Success))
    }
}

/// Faucet that always answers with the same outcome. Clones share the call counter.
#[derive(Clone)]
pub struct MockFaucet {
    outcome: FaucetOutcome,
    calls: Arc<AtomicUsize>,
}

impl MockFaucet {
    pub fn new(outcome: FaucetOutcome) -> Self {
        Self { outcome, calls: Arc::new(AtomicUsize::new(0)) }
    }

    pub fn funded() -> Self {
        Self::new(FaucetOutcome::Success { tx_hash: Some("0xdead".to_string()) })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FundingSource for MockFaucet {
    async fn request_funds(&self, _tag: JobTag, _address: Address) -> FaucetOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}
