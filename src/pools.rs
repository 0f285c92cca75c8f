//! Static pools loaded at startup: outbound proxies and destination wallets.
//!
//! Both pools are immutable after loading and shared read-only across all jobs,
//! so picking from them needs no locking.

use core::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::LazyLock;

use ethers::types::Address;
use log::{info, warn};
use rand::seq::SliceRandom;
use regex::Regex;

use crate::error::{FaucetBotError, Result};

static ADDRESS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("static address pattern"));

/// One proxy URI, passed through to the HTTP client as-is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProxyEntry(String);

impl ProxyEntry {
    /// Build an entry from one list line. Lines without a scheme are treated as `http://`.
    pub fn new(line: &str) -> Self {
        let line = line.trim();
        if line.contains("://") {
            Self(line.to_string())
        } else {
            Self(format!("http://{}", line))
        }
    }

    /// Full proxy URI, including credentials.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProxyEntry {
    // Never print credentials.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0.split_once("://"), self.0.rfind('@')) {
            (Some((scheme, _)), Some(at)) => write!(f, "{}://***@{}", scheme, &self.0[at + 1..]),
            _ => f.write_str(&self.0),
        }
    }
}

/// Rotating proxy pool. Empty means every request goes out directly.
#[derive(Clone, Debug, Default)]
pub struct ProxyPool {
    entries: Vec<ProxyEntry>,
}

impl ProxyPool {
    /// Parse one proxy per line, skipping blanks and `#` comments.
    pub fn from_lines(text: &str) -> Self {
        let entries = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(ProxyEntry::new)
            .collect();
        Self { entries }
    }

    /// Load the proxy list. A missing file yields an empty pool.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No proxy file at {}, using direct connections", path.display());
            return Ok(Self::default());
        }
        let pool = Self::from_lines(&std::fs::read_to_string(path)?);
        info!("📋 Loaded {} proxies", pool.len());
        Ok(pool)
    }

    /// Uniform random pick, `None` for a direct connection.
    pub fn pick(&self) -> Option<&ProxyEntry> {
        self.entries.choose(&mut rand::thread_rng())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A validated destination wallet, kept verbatim as listed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestinationAddress {
    raw: String,
    address: Address,
}

impl DestinationAddress {
    /// Accepts exactly `0x` followed by 40 hex characters.
    pub fn parse(line: &str) -> Option<Self> {
        if !ADDRESS_PATTERN.is_match(line) {
            return None;
        }
        let address = Address::from_str(line).ok()?;
        Some(Self { raw: line.to_string(), address })
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// The address exactly as it appeared in the wallet list.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Short form for log lines.
    pub fn short(&self) -> &str {
        &self.raw[..10]
    }
}

impl fmt::Display for DestinationAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Result of parsing a wallet list.
#[derive(Debug, Default)]
pub struct ParsedDestinations {
    pub pool: DestinationPool,
    /// Non-comment, non-blank lines that failed validation
    pub rejected: Vec<String>,
}

/// Pool of destination wallets that sweeps are sent to.
#[derive(Clone, Debug, Default)]
pub struct DestinationPool {
    entries: Vec<DestinationAddress>,
}

impl DestinationPool {
    /// Parse one address per line. Blank lines and `#` comments are skipped silently.
    pub fn from_lines(text: &str) -> ParsedDestinations {
        let mut parsed = ParsedDestinations::default();
        for line in text.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            match DestinationAddress::parse(line) {
                Some(dest) => parsed.pool.entries.push(dest),
                None => parsed.rejected.push(line.to_string()),
            }
        }
        parsed
    }

    /// Read and parse the wallet list. A missing file is a configuration error.
    pub fn read(path: impl AsRef<Path>) -> Result<ParsedDestinations> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(FaucetBotError::Config {
                reason: format!("wallet file {} not found", path.display()),
            });
        }
        Ok(Self::from_lines(&std::fs::read_to_string(path)?))
    }

    /// Load the wallet list, warning about every rejected line.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let parsed = Self::read(path)?;
        for line in &parsed.rejected {
            warn!("⚠️  Invalid wallet address format: {}", line);
        }
        info!("📋 Loaded {} destination wallets", parsed.pool.len());
        Ok(parsed.pool)
    }

    /// Uniform random pick; `None` only when the pool is empty.
    pub fn pick(&self) -> Option<&DestinationAddress> {
        self.entries.choose(&mut rand::thread_rng())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<DestinationAddress> for DestinationPool {
    fn from_iter<I: IntoIterator<Item = DestinationAddress>>(iter: I) -> Self {
        Self { entries: iter.into_iter().collect() }
    }
}
