//! EVM chain adapter module.
//!
//! Provides the JSON-RPC implementation of the [`ChainClient`](crate::runtime::ChainClient)
//! seam used for balance polling and sweeping.

mod real_adapter;

pub use real_adapter::{EthereumAdapter, DEFAULT_RPC_TIMEOUT};

/// Default RPC endpoint (Intuition testnet).
pub const DEFAULT_RPC_URL: &str = "https://testnet.rpc.intuition.systems/http";
