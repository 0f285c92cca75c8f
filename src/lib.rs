//! # Faucet Harvest
//!
//! Concurrent testnet faucet harvesting.
//!
//! Each job generates a throwaway wallet, asks a faucet to fund it, waits for the
//! funds to land and then sweeps the whole balance (minus gas) to one of a set of
//! destination wallets. Jobs run in parallel on a bounded worker pool.
//!
//! ## Pipeline
//!
//! - **Wallet factory**: [`EphemeralWallet::generate`], one key per job, never persisted
//! - **Faucet client**: [`FaucetClient`], rotating proxies and fixed-delay retries
//! - **Sweeper**: [`Sweeper`], error-kind driven retries, no rebroadcast after send
//! - **Orchestrator**: [`JobOrchestrator`], faucet → balance polling → sweep
//! - **Worker pool**: [`WorkerPool`], bounded parallelism with an [`Aggregator`]
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use faucet_harvest::adapters::ethereum::EthereumAdapter;
//! use faucet_harvest::faucet::{FaucetClient, DEFAULT_FAUCET_ORIGIN, DEFAULT_FAUCET_URL, DEFAULT_ROLLUP};
//! use faucet_harvest::pools::{DestinationPool, ProxyPool};
//! use faucet_harvest::runtime::{JobOrchestrator, JobSettings, SweepPolicy, Sweeper, WorkerPool};
//!
//! # async fn run() -> faucet_harvest::Result<()> {
//! let chain = Arc::new(EthereumAdapter::connect("https://testnet.rpc.intuition.systems/http").await?);
//! let proxies = Arc::new(ProxyPool::load("proxy.txt")?);
//! let destinations = Arc::new(DestinationPool::load("wallets.txt")?);
//!
//! let faucet = FaucetClient::new(DEFAULT_FAUCET_URL, DEFAULT_FAUCET_ORIGIN, DEFAULT_ROLLUP, proxies);
//! let sweeper = Sweeper::new(Arc::clone(&chain), SweepPolicy::default());
//! let jobs = JobOrchestrator::new(chain, faucet, sweeper, destinations, JobSettings::default());
//!
//! let summary = WorkerPool::new(4)?.run(Arc::new(jobs), 20).await;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```

// Module declarations
pub mod adapters;
pub mod config;
pub mod error;
pub mod faucet;
pub mod pools;
pub mod runtime;
pub mod types;

// Re-export the pipeline
pub use faucet::{FaucetClient, FaucetOutcome, FundingSource};
pub use pools::{DestinationAddress, DestinationPool, ProxyEntry, ProxyPool};
pub use runtime::{
    Aggregator, ChainClient, EphemeralWallet, JobOrchestrator, Sweeper, TransferOutcome,
    WorkerPool,
};

// Re-export types
pub use error::{FaucetBotError, Result};
pub use types::{DelayRange, JobTag};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
