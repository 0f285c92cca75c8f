//! Run configuration: command line / environment, plus the interactive prompts for
//! job and worker counts.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;

use crate::adapters::ethereum::DEFAULT_RPC_URL;
use crate::error::{FaucetBotError, Result};
use crate::faucet::{DEFAULT_FAUCET_ORIGIN, DEFAULT_FAUCET_URL, DEFAULT_ROLLUP};
use crate::runtime::orchestrator::{DEFAULT_EXPLORER_TX_URL, DEFAULT_TOKEN_SYMBOL};

/// Testnet faucet harvester.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// Chain JSON-RPC endpoint
    #[arg(long, env = "FAUCET_RPC_URL", default_value = DEFAULT_RPC_URL)]
    pub rpc_url: String,

    /// Faucet API endpoint
    #[arg(long, env = "FAUCET_API_URL", default_value = DEFAULT_FAUCET_URL)]
    pub faucet_url: String,

    /// Origin sent with faucet requests (Referer is derived from it)
    #[arg(long, env = "FAUCET_ORIGIN", default_value = DEFAULT_FAUCET_ORIGIN)]
    pub faucet_origin: String,

    /// Rollup subdomain the faucet funds on
    #[arg(long = "rollup", env = "FAUCET_ROLLUP", default_value = DEFAULT_ROLLUP)]
    pub rollup: String,

    /// Explorer prefix for transaction links
    #[arg(long, env = "FAUCET_EXPLORER_URL", default_value = DEFAULT_EXPLORER_TX_URL)]
    pub explorer_url: String,

    /// Native token symbol for balance output
    #[arg(long, env = "FAUCET_SYMBOL", default_value = DEFAULT_TOKEN_SYMBOL)]
    pub symbol: String,

    /// Destination wallet list, one address per line
    #[arg(long, env = "FAUCET_WALLETS_FILE", default_value = "wallets.txt")]
    pub wallets: PathBuf,

    /// Proxy list, one URI per line
    #[arg(long, env = "FAUCET_PROXIES_FILE", default_value = "proxy.txt")]
    pub proxies: PathBuf,

    /// Number of jobs (prompted when absent)
    #[arg(long, env = "FAUCET_JOBS")]
    pub jobs: Option<usize>,

    /// Number of parallel workers (prompted when absent)
    #[arg(long, env = "FAUCET_THREADS")]
    pub threads: Option<usize>,
}

/// How many jobs to run and how many at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunParams {
    pub jobs: usize,
    pub workers: usize,
}

impl RunParams {
    /// Validate and clamp: both positive, workers never above jobs.
    pub fn new(jobs: usize, workers: usize) -> Result<Self> {
        if jobs == 0 || workers == 0 {
            return Err(FaucetBotError::InvalidInput {
                reason: format!("jobs ({jobs}) and threads ({workers}) must both be at least 1"),
            });
        }
        Ok(Self { jobs, workers: workers.min(jobs) })
    }
}

impl Config {
    /// Take counts from flags, prompting on stdin for whatever is missing.
    pub fn run_params(&self) -> Result<RunParams> {
        let stdin = io::stdin();
        let mut input = stdin.lock();
        let mut output = io::stdout();

        let jobs = match self.jobs {
            Some(jobs) => jobs,
            None => prompt_count(&mut input, &mut output, "🔢 Enter number of loops: ")?,
        };
        let workers = match self.threads {
            Some(threads) => threads,
            None => prompt_count(&mut input, &mut output, "🧵 Enter number of threads: ")?,
        };
        RunParams::new(jobs, workers)
    }
}

/// Ask until a positive integer is entered. EOF is an error.
pub fn prompt_count<R: BufRead, W: Write>(input: &mut R, output: &mut W, prompt: &str) -> Result<usize> {
    loop {
        write!(output, "{prompt}")?;
        output.flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err(FaucetBotError::InvalidInput {
                reason: "input closed before a number was entered".to_string(),
            });
        }
        match line.trim().parse::<usize>() {
            Ok(n) if n > 0 => return Ok(n),
            _ => writeln!(output, "Please enter a positive whole number.")?,
        }
    }
}
