//! Job execution runtime: wallets, chain access, sweeping, orchestration and the worker pool.

pub mod blockchain_adapter;
pub mod orchestrator;
pub mod sweeper;
pub mod wallet_manager;
pub mod worker_pool;

pub use blockchain_adapter::{
    ChainClient, ChainError, ChainErrorKind, ChainResult, ReceiptStatus, TransferRequest,
    TRANSFER_GAS_LIMIT,
};
pub use orchestrator::{JobOrchestrator, JobSettings, JobState};
pub use sweeper::{sweep_amount, SweepPolicy, Sweeper, TransferOutcome};
pub use wallet_manager::EphemeralWallet;
pub use worker_pool::{Aggregator, JobRunner, Progress, Summary, WorkerPool};
