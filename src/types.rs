//! Core types shared by every stage of a harvesting job.

use core::fmt;
use std::time::Duration;

use rand::Rng;

/// Identifies one job within a run, for log prefixes and progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct JobTag {
    /// 1-based job index
    pub index: usize,
    /// Number of jobs in the run
    pub total: usize,
}

impl JobTag {
    /// Create a new job tag.
    pub fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }
}

impl fmt::Display for JobTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[Job {:2}/{}]", self.index, self.total)
    }
}

/// A pause between attempts: fixed when `min == max`, uniformly random otherwise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DelayRange {
    pub min: Duration,
    pub max: Duration,
}

impl DelayRange {
    /// No delay at all.
    pub const ZERO: Self = Self::fixed(Duration::ZERO);

    /// A constant delay.
    pub const fn fixed(delay: Duration) -> Self {
        Self { min: delay, max: delay }
    }

    /// A delay drawn uniformly from `[min_secs, max_secs]` at millisecond granularity.
    pub const fn between_secs(min_secs: u64, max_secs: u64) -> Self {
        Self {
            min: Duration::from_secs(min_secs),
            max: Duration::from_secs(max_secs),
        }
    }

    /// Draw one delay from the range.
    pub fn sample(&self) -> Duration {
        if self.max <= self.min {
            return self.min;
        }
        let min_ms = self.min.as_millis() as u64;
        let max_ms = self.max.as_millis() as u64;
        Duration::from_millis(rand::thread_rng().gen_range(min_ms..=max_ms))
    }
}
