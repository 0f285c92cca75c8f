//! Faucet HTTP client with per-attempt proxy rotation and fixed-delay retries.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use ethers::types::Address;
use ethers::utils::to_checksum;
use log::{debug, info, warn};
use reqwest::header::{ACCEPT, CONTENT_TYPE, ORIGIN, REFERER, USER_AGENT};
use reqwest::{Client, Proxy, StatusCode};
use serde_json::{json, Value};

use super::response::{classify_body, FaucetOutcome};
use super::user_agent::random_user_agent;
use super::FundingSource;
use crate::pools::{ProxyEntry, ProxyPool};
use crate::types::{DelayRange, JobTag};

/// Default faucet endpoint (Intuition testnet hub).
pub const DEFAULT_FAUCET_URL: &str =
    "https://testnet.hub.intuition.systems/api/trpc/faucet.requestFaucetFunds?batch=1";

/// Default `Origin`/`Referer` base for faucet requests.
pub const DEFAULT_FAUCET_ORIGIN: &str = "https://testnet.hub.intuition.systems";

/// Default rollup the faucet is asked to fund on.
pub const DEFAULT_ROLLUP: &str = "intuition-testnet";

/// Retry behaviour for faucet requests.
#[derive(Clone, Debug)]
pub struct FaucetRetryPolicy {
    /// Total attempts, including the first
    pub attempts: u32,
    /// Fixed pause between non-terminal attempts
    pub delay: DelayRange,
    /// Per-attempt request timeout
    pub timeout: Duration,
}

impl Default for FaucetRetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: DelayRange::fixed(Duration::from_secs(3)),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Client for the faucet's `requestFaucetFunds` endpoint.
pub struct FaucetClient {
    endpoint: String,
    origin: String,
    rollup: String,
    proxies: Arc<ProxyPool>,
    policy: FaucetRetryPolicy,
}

impl FaucetClient {
    /// Create a new faucet client.
    pub fn new(
        endpoint: impl Into<String>,
        origin: impl Into<String>,
        rollup: impl Into<String>,
        proxies: Arc<ProxyPool>,
    ) -> Self {
        Self {
            endpoint: endpoint.into(),
            origin: origin.into().trim_end_matches('/').to_string(),
            rollup: rollup.into(),
            proxies,
            policy: FaucetRetryPolicy::default(),
        }
    }

    /// Replace the retry policy.
    pub fn with_policy(mut self, policy: FaucetRetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &FaucetRetryPolicy {
        &self.policy
    }

    /// Batched tRPC envelope for one funding request.
    pub fn payload(&self, recipient: &str) -> Value {
        json!({
            "0": {
                "json": {
                    "rollupSubdomain": self.rollup,
                    "recipientAddress": recipient,
                    "turnstileToken": "",
                    "tokenRollupAddress": null
                },
                "meta": {
                    "values": {
                        "tokenRollupAddress": ["undefined"]
                    }
                }
            }
        })
    }

    /// Request funds for `address`, retrying non-terminal outcomes.
    ///
    /// Returns on the first `Success` or `RateLimited`; otherwise sleeps the fixed
    /// delay and tries again with a fresh proxy and User-Agent. After the last attempt
    /// the result is `Fail("exhausted retries ...")`.
    pub async fn request_funds(&self, tag: JobTag, address: Address) -> FaucetOutcome {
        let payload = self.payload(&to_checksum(&address, None));
        let attempts = self.policy.attempts;

        for attempt in 1..=attempts {
            let proxy = self.proxies.pick();
            let outcome = self.attempt(&payload, proxy).await;

            match &outcome {
                FaucetOutcome::Success { .. } | FaucetOutcome::RateLimited { .. } => return outcome,
                FaucetOutcome::Fail { message } => {
                    warn!("{tag} ⚠️  Attempt {attempt}: Faucet failed → {message}");
                }
                FaucetOutcome::ServerError { message, code } => {
                    let code = code.map_or_else(|| "none".to_string(), |c| c.to_string());
                    warn!("{tag} ⛔ Attempt {attempt}: Server error → {message} (code={code})");
                }
                FaucetOutcome::Invalid { raw } => {
                    warn!("{tag} ⚠️  Attempt {attempt}: Invalid response");
                    debug!("{tag} raw faucet body: {}", truncate(raw, 200));
                }
                FaucetOutcome::NetworkError { message } => {
                    warn!("{tag} ⚠️  Attempt {attempt}: Network error → {}", truncate(message, 80));
                }
            }

            if attempt < attempts {
                let delay = self.policy.delay.sample();
                info!("{tag} ⏳ Retrying in {} seconds...", delay.as_secs());
                tokio::time::sleep(delay).await;
            }
        }

        FaucetOutcome::Fail {
            message: format!("exhausted retries after {} attempts", attempts),
        }
    }

    async fn attempt(&self, payload: &Value, proxy: Option<&ProxyEntry>) -> FaucetOutcome {
        // Fresh client per attempt: each request may leave through a different proxy.
        let client = match self.build_client(proxy) {
            Ok(client) => client,
            Err(e) => return FaucetOutcome::NetworkError { message: e.to_string() },
        };

        let response = client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "*/*")
            .header(ORIGIN, self.origin.as_str())
            .header(REFERER, format!("{}/", self.origin))
            .header(USER_AGENT, random_user_agent())
            .json(payload)
            .send()
            .await;

        let response = match response {
            Ok(response) => response,
            Err(e) => return FaucetOutcome::NetworkError { message: e.to_string() },
        };

        let status = response.status();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return FaucetOutcome::NetworkError { message: e.to_string() },
        };

        match classify_body(&body) {
            FaucetOutcome::Invalid { .. } if status == StatusCode::TOO_MANY_REQUESTS => {
                FaucetOutcome::RateLimited {
                    message: format!("HTTP {}", status),
                }
            }
            outcome => outcome,
        }
    }

    fn build_client(&self, proxy: Option<&ProxyEntry>) -> reqwest::Result<Client> {
        let mut builder = Client::builder().timeout(self.policy.timeout);
        if let Some(proxy) = proxy {
            builder = builder.proxy(Proxy::all(proxy.as_str())?);
        }
        builder.build()
    }
}

#[async_trait]
impl FundingSource for FaucetClient {
    async fn request_funds(&self, tag: JobTag, address: Address) -> FaucetOutcome {
        FaucetClient::request_funds(self, tag, address).await
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> FaucetClient {
        FaucetClient::new(
            DEFAULT_FAUCET_URL,
            "https://testnet.hub.intuition.systems/",
            DEFAULT_ROLLUP,
            Arc::new(ProxyPool::default()),
        )
    }

    #[test]
    fn test_payload_envelope() {
        let payload = client().payload("0x1111111111111111111111111111111111111111");
        let inner = &payload["0"]["json"];
        assert_eq!(inner["rollupSubdomain"], "intuition-testnet");
        assert_eq!(inner["recipientAddress"], "0x1111111111111111111111111111111111111111");
        assert_eq!(inner["turnstileToken"], "");
        assert!(inner["tokenRollupAddress"].is_null());
        assert_eq!(payload["0"]["meta"]["values"]["tokenRollupAddress"][0], "undefined");
    }

    #[test]
    fn test_origin_trailing_slash_trimmed() {
        assert_eq!(client().origin, "https://testnet.hub.intuition.systems");
    }

    #[test]
    fn test_default_policy() {
        let policy = FaucetRetryPolicy::default();
        assert_eq!(policy.attempts, 5);
        assert_eq!(policy.delay, DelayRange::fixed(Duration::from_secs(3)));
        assert_eq!(policy.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abcdef", 3), "abc...");
        assert_eq!(truncate("abc", 3), "abc");
    }
}
