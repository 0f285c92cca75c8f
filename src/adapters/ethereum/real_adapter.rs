//! Production EVM chain adapter.
//!
//! Uses `ethers-rs` to talk to any EVM JSON-RPC endpoint over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use ethers::prelude::*;
use ethers::providers::{ProviderError, RpcError};
use ethers::types::transaction::eip2718::TypedTransaction;
use reqwest::Url;

use crate::error::{FaucetBotError, Result};
use crate::runtime::blockchain_adapter::{
    ChainClient, ChainError, ChainErrorKind, ChainResult, ReceiptStatus, TransferRequest,
};
use crate::runtime::wallet_manager::EphemeralWallet;

/// How often a pending receipt is re-queried.
const RECEIPT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound for any single JSON-RPC request.
pub const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(30);

/// EVM adapter over an HTTP JSON-RPC provider.
pub struct EthereumAdapter {
    provider: Provider<Http>,
    chain_id: u64,
}

impl EthereumAdapter {
    /// Connect to `rpc_url` with [`DEFAULT_RPC_TIMEOUT`] and fetch the chain id.
    pub async fn connect(rpc_url: &str) -> Result<Self> {
        Self::connect_with_timeout(rpc_url, DEFAULT_RPC_TIMEOUT).await
    }

    /// Connect to `rpc_url` and fetch the chain id. Every request made through the
    /// adapter, including this one, is bounded by `timeout`.
    ///
    /// The chain id request doubles as the reachability check; failure here is a
    /// configuration error.
    pub async fn connect_with_timeout(rpc_url: &str, timeout: Duration) -> Result<Self> {
        let provider = http_provider(rpc_url, timeout)?;

        let chain_id = provider
            .get_chainid()
            .await
            .map_err(|e| FaucetBotError::NetworkError {
                reason: format!("Failed to connect to RPC {}: {}", rpc_url, e),
            })?
            .as_u64();

        Ok(Self { provider, chain_id })
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// Classify a provider failure. Transport errors are typed; node rejections only
    /// carry their JSON-RPC message.
    fn map_error(err: ProviderError) -> ChainError {
        let kind = match &err {
            ProviderError::HTTPError(e) if e.is_timeout() => ChainErrorKind::Timeout,
            ProviderError::HTTPError(_) => ChainErrorKind::Network,
            other => match RpcError::as_error_response(other) {
                Some(rpc) => ChainErrorKind::from_rpc_message(&rpc.message),
                None if RpcError::is_serde_error(other) => ChainErrorKind::Other,
                None => ChainErrorKind::from_rpc_message(&other.to_string()),
            },
        };
        ChainError::new(kind, err.to_string())
    }

    async fn poll_receipt(&self, tx_hash: TxHash) -> ChainResult<ReceiptStatus> {
        loop {
            let receipt = self
                .provider
                .get_transaction_receipt(tx_hash)
                .await
                .map_err(Self::map_error)?;

            if let Some(receipt) = receipt {
                return Ok(if receipt.status == Some(U64::from(1)) {
                    ReceiptStatus::Success
                } else {
                    ReceiptStatus::Reverted
                });
            }
            tokio::time::sleep(RECEIPT_POLL_INTERVAL).await;
        }
    }
}

fn http_provider(rpc_url: &str, timeout: Duration) -> Result<Provider<Http>> {
    let url = Url::parse(rpc_url).map_err(|e| FaucetBotError::Config {
        reason: format!("Invalid RPC URL {}: {}", rpc_url, e),
    })?;
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| FaucetBotError::Config {
            reason: format!("Failed to build RPC client: {}", e),
        })?;
    Ok(Provider::new(Http::new_with_client(url, client)))
}

#[async_trait]
impl ChainClient for EthereumAdapter {
    async fn balance(&self, address: Address) -> ChainResult<U256> {
        self.provider.get_balance(address, None).await.map_err(Self::map_error)
    }

    async fn gas_price(&self) -> ChainResult<U256> {
        self.provider.get_gas_price().await.map_err(Self::map_error)
    }

    async fn pending_nonce(&self, address: Address) -> ChainResult<U256> {
        self.provider
            .get_transaction_count(address, Some(BlockNumber::Pending.into()))
            .await
            .map_err(Self::map_error)
    }

    async fn send_transfer(
        &self,
        wallet: &EphemeralWallet,
        transfer: &TransferRequest,
    ) -> ChainResult<TxHash> {
        // Legacy transaction: fixed gas price, no EIP-1559 fields.
        let tx: TypedTransaction = TransactionRequest::new()
            .from(wallet.address())
            .to(transfer.to)
            .value(transfer.value)
            .gas(transfer.gas_limit)
            .gas_price(transfer.gas_price)
            .nonce(transfer.nonce)
            .chain_id(self.chain_id)
            .into();

        // The request carries the chain id, so the signer's own default is never used.
        let signature = wallet
            .signer()
            .sign_transaction_sync(&tx)
            .map_err(|e| ChainError::new(ChainErrorKind::Other, format!("signing failed: {e}")))?;

        let pending = self
            .provider
            .send_raw_transaction(tx.rlp_signed(&signature))
            .await
            .map_err(Self::map_error)?;

        Ok(pending.tx_hash())
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        timeout: Duration,
    ) -> ChainResult<ReceiptStatus> {
        tokio::time::timeout(timeout, self.poll_receipt(tx_hash))
            .await
            .map_err(|_| {
                ChainError::new(
                    ChainErrorKind::Timeout,
                    format!("no receipt for {:?} after {}s", tx_hash, timeout.as_secs()),
                )
            })?
    }
}
