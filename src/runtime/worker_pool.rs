//! Bounded worker pool and result aggregation.
//!
//! A fixed set of workers drains a shared job counter, so exactly `total`
//! jobs run with at most `workers` in flight. Results are recorded in
//! completion order by whichever worker finished the job.

use core::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use log::{error, info};
use tokio::task::JoinSet;

use crate::error::{FaucetBotError, Result};
use crate::types::JobTag;

/// One unit of work the pool can run.
#[async_trait]
pub trait JobRunner: Send + Sync + 'static {
    /// Run the job to completion; `true` on success.
    async fn run(&self, tag: JobTag) -> bool;
}

/// Counters after one more job completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub succeeded: usize,
    pub total: usize,
}

impl Progress {
    pub fn percent(&self) -> f64 {
        percentage(self.completed, self.total)
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "📊 Progress: {}/{} ({:.1}%) | Success: {}",
            self.completed,
            self.total,
            self.percent(),
            self.succeeded
        )
    }
}

/// Final report of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct Summary {
    pub total: usize,
    pub completed: usize,
    pub succeeded: usize,
    pub duration: Duration,
}

impl Summary {
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }

    pub fn success_rate(&self) -> f64 {
        percentage(self.succeeded, self.total)
    }

    pub fn average_per_job(&self) -> Duration {
        if self.total == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.duration.as_secs_f64() / self.total as f64)
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        writeln!(f, "{rule}")?;
        writeln!(f, "                    📊 FINAL SUMMARY")?;
        writeln!(f, "{rule}")?;
        writeln!(f, "✅ Total Success    : {}", self.succeeded)?;
        writeln!(f, "📢 Total Jobs       : {}", self.total)?;
        writeln!(f, "❌ Failed Jobs      : {}", self.failed())?;
        writeln!(f, "📊 Success Rate     : {:.2}%", self.success_rate())?;
        writeln!(f, "⏱️  Duration        : {:.2} seconds", self.duration.as_secs_f64())?;
        writeln!(f, "⚡ Average per job  : {:.2} seconds", self.average_per_job().as_secs_f64())?;
        write!(f, "{rule}")
    }
}

fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// Shared, synchronized run counters handed to every worker.
#[derive(Debug)]
pub struct Aggregator {
    total: usize,
    completed: AtomicUsize,
    succeeded: AtomicUsize,
    started: Instant,
    /// Serializes progress reporting so consecutive lines never go backwards
    report: Mutex<()>,
}

impl Aggregator {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: AtomicUsize::new(0),
            succeeded: AtomicUsize::new(0),
            started: Instant::now(),
            report: Mutex::new(()),
        }
    }

    /// Record one finished job and log the running totals.
    pub fn record(&self, success: bool) -> Progress {
        // A poisoned lock only means another reporter panicked mid-log.
        let _guard = self.report.lock().unwrap_or_else(|e| e.into_inner());
        if success {
            self.succeeded.fetch_add(1, Ordering::SeqCst);
        }
        let completed = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let progress = Progress {
            completed,
            succeeded: self.succeeded.load(Ordering::SeqCst),
            total: self.total,
        };
        info!("{progress}");
        progress
    }

    pub fn snapshot(&self) -> Progress {
        Progress {
            completed: self.completed.load(Ordering::SeqCst),
            succeeded: self.succeeded.load(Ordering::SeqCst),
            total: self.total,
        }
    }

    pub fn summary(&self) -> Summary {
        let progress = self.snapshot();
        Summary {
            total: self.total,
            completed: progress.completed,
            succeeded: progress.succeeded,
            duration: self.started.elapsed(),
        }
    }
}

/// Fixed-size pool of async workers.
#[derive(Clone, Copy, Debug)]
pub struct WorkerPool {
    workers: usize,
}

impl WorkerPool {
    /// Create a pool with `workers` parallel slots (at least one).
    pub fn new(workers: usize) -> Result<Self> {
        if workers == 0 {
            return Err(FaucetBotError::InvalidInput {
                reason: "worker count must be at least 1".to_string(),
            });
        }
        Ok(Self { workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run `total` jobs and return the final summary. Never fails: a panicking
    /// job is counted as a failure.
    pub async fn run<R: JobRunner>(&self, runner: Arc<R>, total: usize) -> Summary {
        let aggregator = Arc::new(Aggregator::new(total));
        let next_job = Arc::new(AtomicUsize::new(0));
        let mut workers = JoinSet::new();

        for _ in 0..self.workers.min(total) {
            let runner = Arc::clone(&runner);
            let aggregator = Arc::clone(&aggregator);
            let next_job = Arc::clone(&next_job);

            workers.spawn(async move {
                loop {
                    let index = next_job.fetch_add(1, Ordering::SeqCst);
                    if index >= total {
                        break;
                    }
                    let tag = JobTag::new(index + 1, total);

                    // Isolate each job so a panic costs one job, not the worker.
                    let job_runner = Arc::clone(&runner);
                    let success = tokio::spawn(async move { job_runner.run(tag).await })
                        .await
                        .unwrap_or_else(|e| {
                            error!("{tag} ❌ Job aborted: {e}");
                            false
                        });
                    aggregator.record(success);
                }
            });
        }

        while let Some(joined) = workers.join_next().await {
            if let Err(e) = joined {
                error!("Worker stopped unexpectedly: {e}");
            }
        }

        aggregator.summary()
    }
}
