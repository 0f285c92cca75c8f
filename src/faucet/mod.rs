//! Faucet automation.
//!
//! Requests testnet funds for freshly generated addresses and classifies the
//! faucet's answer into a [`FaucetOutcome`].

mod client;
mod response;
mod user_agent;

pub use client::{
    FaucetClient, FaucetRetryPolicy, DEFAULT_FAUCET_ORIGIN, DEFAULT_FAUCET_URL, DEFAULT_ROLLUP,
};
pub use response::{classify_body, FaucetOutcome, RATE_LIMIT_STATUS};
pub use user_agent::random_user_agent;

use async_trait::async_trait;
use ethers::types::Address;

use crate::types::JobTag;

/// Anything that can be asked to fund an address.
#[async_trait]
pub trait FundingSource: Send + Sync {
    /// Run the full request/retry cycle and return the final outcome.
    async fn request_funds(&self, tag: JobTag, address: Address) -> FaucetOutcome;
}
