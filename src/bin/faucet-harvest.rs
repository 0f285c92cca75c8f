//! Faucet harvester CLI.
//!
//! Generates throwaway wallets, funds them from the faucet and sweeps the
//! balance to the configured destination wallets.
//!
//! Usage:
//!   faucet-harvest --wallets wallets.txt --proxies proxy.txt [--jobs N --threads M]

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use log::{error, info};

use faucet_harvest::adapters::ethereum::EthereumAdapter;
use faucet_harvest::config::Config;
use faucet_harvest::faucet::FaucetClient;
use faucet_harvest::pools::{DestinationPool, ProxyPool};
use faucet_harvest::runtime::{JobOrchestrator, JobSettings, SweepPolicy, Sweeper, WorkerPool};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env::set_var(
        env_logger::DEFAULT_FILTER_ENV,
        env::var_os(env_logger::DEFAULT_FILTER_ENV).unwrap_or_else(|| "info".into()),
    );
    env_logger::init();

    let config = Config::parse();

    println!("\n{}", "=".repeat(70));
    println!("           🚰 TESTNET FAUCET AUTO BOT  🚰");
    println!("{}", "=".repeat(70));

    // Pre-flight: RPC and wallet list must be usable before any job starts.
    let chain = match EthereumAdapter::connect(&config.rpc_url).await {
        Ok(chain) => Arc::new(chain),
        Err(e) => {
            error!("❌ Failed to connect to RPC. Check network/RPC URL.");
            return Err(e).context("RPC pre-flight failed");
        }
    };
    info!("Connected to chain {} via {}", chain.chain_id(), config.rpc_url);

    let proxies = Arc::new(ProxyPool::load(&config.proxies).context("loading proxy list")?);
    let destinations =
        Arc::new(DestinationPool::load(&config.wallets).context("loading wallet list")?);
    if destinations.is_empty() {
        bail!(
            "No destination wallets loaded! Please check {}",
            config.wallets.display()
        );
    }

    let params = config.run_params().context("reading run parameters")?;
    let pool = WorkerPool::new(params.workers)?;

    let faucet = FaucetClient::new(
        config.faucet_url.clone(),
        config.faucet_origin.clone(),
        config.rollup.clone(),
        Arc::clone(&proxies),
    );
    let sweeper = Sweeper::new(Arc::clone(&chain), SweepPolicy::default());
    let settings = JobSettings {
        explorer_tx_url: config.explorer_url.clone(),
        token_symbol: config.symbol.clone(),
        ..JobSettings::default()
    };
    let orchestrator = Arc::new(JobOrchestrator::new(
        chain,
        faucet,
        sweeper,
        destinations,
        settings,
    ));

    info!(
        "🚀 Starting {} jobs with {} threads...",
        params.jobs,
        pool.workers()
    );
    let summary = pool.run(orchestrator, params.jobs).await;

    println!("\n{summary}");
    Ok(())
}
