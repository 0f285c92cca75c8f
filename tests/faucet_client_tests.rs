//! Faucet client against a mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use ethers::types::Address;
use ethers::utils::to_checksum;
use httpmock::Method::POST;
use httpmock::MockServer;
use serde_json::json;

use faucet_harvest::faucet::{FaucetClient, FaucetOutcome, FaucetRetryPolicy};
use faucet_harvest::pools::ProxyPool;
use faucet_harvest::{DelayRange, JobTag};

const ATTEMPTS: u32 = 3;

fn client(endpoint: String) -> FaucetClient {
    FaucetClient::new(
        endpoint,
        "https://hub.example.test/",
        "intuition-testnet",
        Arc::new(ProxyPool::default()),
    )
    .with_policy(FaucetRetryPolicy {
        attempts: ATTEMPTS,
        delay: DelayRange::ZERO,
        timeout: Duration::from_secs(5),
    })
}

fn recipient() -> Address {
    Address::repeat_byte(0x5a)
}

fn tag() -> JobTag {
    JobTag::new(1, 1)
}

#[tokio::test]
async fn success_returns_after_one_request() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/faucet");
            then.status(200).json_body(json!([
                {"result": {"data": {"json": {"success": true, "transactionHash": "0xfeed"}}}}
            ]));
        })
        .await;

    let outcome = client(server.url("/faucet")).request_funds(tag(), recipient()).await;

    assert_eq!(outcome, FaucetOutcome::Success { tx_hash: Some("0xfeed".to_string()) });
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn rate_limit_is_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/faucet");
            then.status(200).json_body(json!([
                {"error": {"json": {"message": "Too many requests", "data": {"httpStatus": 429}}}}
            ]));
        })
        .await;

    let outcome = client(server.url("/faucet")).request_funds(tag(), recipient()).await;

    assert!(matches!(outcome, FaucetOutcome::RateLimited { ref message } if message == "Too many requests"));
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn refusals_exhaust_every_attempt() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/faucet");
            then.status(200).json_body(json!([
                {"result": {"data": {"json": {"success": false, "message": "Try later"}}}}
            ]));
        })
        .await;

    let outcome = client(server.url("/faucet")).request_funds(tag(), recipient()).await;

    match outcome {
        FaucetOutcome::Fail { message } => assert!(message.contains("exhausted retries")),
        other => panic!("expected exhausted retries, got {other:?}"),
    }
    mock.assert_hits_async(ATTEMPTS as usize).await;
}

#[tokio::test]
async fn html_body_is_retried_as_invalid() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/faucet");
            then.status(502).body("<html>bad gateway</html>");
        })
        .await;

    let outcome = client(server.url("/faucet")).request_funds(tag(), recipient()).await;

    assert!(matches!(outcome, FaucetOutcome::Fail { .. }));
    mock.assert_hits_async(ATTEMPTS as usize).await;
}

#[tokio::test]
async fn status_429_without_envelope_is_rate_limited() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/faucet");
            then.status(429).body("slow down");
        })
        .await;

    let outcome = client(server.url("/faucet")).request_funds(tag(), recipient()).await;

    assert!(matches!(outcome, FaucetOutcome::RateLimited { .. }));
    mock.assert_hits_async(1).await;
}

#[tokio::test]
async fn server_error_is_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/faucet");
            then.status(500).json_body(json!([
                {"error": {"json": {"message": "Internal", "code": -32603}}}
            ]));
        })
        .await;

    let outcome = client(server.url("/faucet")).request_funds(tag(), recipient()).await;

    assert!(matches!(outcome, FaucetOutcome::Fail { .. }));
    mock.assert_hits_async(ATTEMPTS as usize).await;
}

#[tokio::test]
async fn unreachable_faucet_fails_after_retries() {
    let outcome = client("http://127.0.0.1:1/faucet".to_string())
        .request_funds(tag(), recipient())
        .await;

    match outcome {
        FaucetOutcome::Fail { message } => assert!(message.contains(&ATTEMPTS.to_string())),
        other => panic!("expected failure, got {other:?}"),
    }
}

#[tokio::test]
async fn request_carries_checksum_recipient_and_browser_headers() {
    let server = MockServer::start_async().await;
    let checksum = to_checksum(&recipient(), None);
    let partial = json!({
        "0": {"json": {"rollupSubdomain": "intuition-testnet", "recipientAddress": checksum}}
    })
    .to_string();

    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/faucet")
                .header("content-type", "application/json")
                .header("origin", "https://hub.example.test")
                .header("referer", "https://hub.example.test/")
                .header_exists("user-agent")
                .json_body_partial(partial);
            then.status(200).json_body(json!([
                {"result": {"data": {"json": {"success": true}}}}
            ]));
        })
        .await;

    let outcome = client(server.url("/faucet")).request_funds(tag(), recipient()).await;

    assert_eq!(outcome, FaucetOutcome::Success { tx_hash: None });
    mock.assert_async().await;
}
