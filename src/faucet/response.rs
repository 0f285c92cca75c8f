//! Faucet response decoding.
//!
//! The faucet speaks a batched tRPC dialect: the body is a JSON array and element 0
//! carries either `result.data.json` or `error.json`. The shape is validated once
//! here and reduced to a [`FaucetOutcome`]; anything else is `Invalid`.

use serde::Deserialize;
use serde_json::Value;

/// HTTP status the faucet uses for rate limiting.
pub const RATE_LIMIT_STATUS: i64 = 429;

const UNKNOWN_ERROR: &str = "Unknown error";

/// Classification of a single faucet attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FaucetOutcome {
    /// Funds were sent; carries the faucet's transaction hash when it reports one
    Success { tx_hash: Option<String> },
    /// The faucet processed the request but refused it
    Fail { message: String },
    /// HTTP 429 from the faucet
    RateLimited { message: String },
    /// Any other error envelope
    ServerError { message: String, code: Option<i64> },
    /// Body did not match the expected shape
    Invalid { raw: String },
    /// Request never produced a response
    NetworkError { message: String },
}

impl FaucetOutcome {
    /// Terminal outcomes stop the retry loop immediately.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::RateLimited { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

#[derive(Debug, Deserialize)]
struct BatchItem {
    result: Option<ResultEnvelope>,
    error: Option<ErrorEnvelope>,
}

#[derive(Debug, Deserialize)]
struct ResultEnvelope {
    data: ResultData,
}

#[derive(Debug, Deserialize)]
struct ResultData {
    json: FundingPayload,
}

#[derive(Debug, Deserialize)]
struct FundingPayload {
    success: Option<bool>,
    #[serde(rename = "transactionHash")]
    transaction_hash: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    #[serde(default)]
    json: Option<ErrorPayload>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    message: Option<String>,
    code: Option<i64>,
    data: Option<ErrorData>,
}

#[derive(Debug, Deserialize)]
struct ErrorData {
    #[serde(rename = "httpStatus")]
    http_status: Option<i64>,
}

/// Classify a raw response body.
pub fn classify_body(body: &str) -> FaucetOutcome {
    match serde_json::from_str::<Value>(body) {
        Ok(value) => classify_value(value, body),
        Err(_) => FaucetOutcome::Invalid { raw: body.to_string() },
    }
}

fn classify_value(value: Value, raw: &str) -> FaucetOutcome {
    let invalid = || FaucetOutcome::Invalid { raw: raw.to_string() };

    let first = match value {
        Value::Array(mut items) if !items.is_empty() => items.swap_remove(0),
        _ => return invalid(),
    };
    let item: BatchItem = match serde_json::from_value(first) {
        Ok(item) => item,
        Err(_) => return invalid(),
    };

    match (item.result, item.error) {
        (Some(result), _) => {
            let payload = result.data.json;
            if payload.success == Some(true) {
                FaucetOutcome::Success { tx_hash: payload.transaction_hash }
            } else {
                FaucetOutcome::Fail {
                    message: payload.message.unwrap_or_else(|| UNKNOWN_ERROR.to_string()),
                }
            }
        }
        (None, Some(error)) => {
            let payload = error.json;
            let message = payload
                .as_ref()
                .and_then(|p| p.message.clone())
                .unwrap_or_else(|| UNKNOWN_ERROR.to_string());
            // httpStatus wins over the generic tRPC code
            let code = payload.as_ref().and_then(|p| {
                p.data.as_ref().and_then(|d| d.http_status).or(p.code)
            });

            if code == Some(RATE_LIMIT_STATUS) {
                FaucetOutcome::RateLimited { message }
            } else {
                FaucetOutcome::ServerError { message, code }
            }
        }
        (None, None) => invalid(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_with_hash() {
        let body = r#"[{"result":{"data":{"json":{"success":true,"transactionHash":"0xdead"}}}}]"#;
        assert_eq!(
            classify_body(body),
            FaucetOutcome::Success { tx_hash: Some("0xdead".to_string()) }
        );
    }

    #[test]
    fn test_rate_limited_via_http_status() {
        let body = r#"[{"error":{"json":{"message":"rate limit","data":{"httpStatus":429}}}}]"#;
        let outcome = classify_body(body);
        assert_eq!(outcome, FaucetOutcome::RateLimited { message: "rate limit".to_string() });
        assert!(outcome.is_terminal());
    }

    #[test]
    fn test_rate_limited_via_generic_code() {
        let body = r#"[{"error":{"json":{"message":"slow down","code":429}}}]"#;
        assert!(matches!(classify_body(body), FaucetOutcome::RateLimited { .. }));
    }

    #[test]
    fn test_http_status_preferred_over_code() {
        let body = r#"[{"error":{"json":{"message":"boom","code":-32603,"data":{"httpStatus":500}}}}]"#;
        assert_eq!(
            classify_body(body),
            FaucetOutcome::ServerError { message: "boom".to_string(), code: Some(500) }
        );
    }

    #[test]
    fn test_success_false_is_fail() {
        let body = r#"[{"result":{"data":{"json":{"success":false,"message":"already claimed"}}}}]"#;
        assert_eq!(
            classify_body(body),
            FaucetOutcome::Fail { message: "already claimed".to_string() }
        );
    }

    #[test]
    fn test_missing_success_flag_is_fail() {
        let body = r#"[{"result":{"data":{"json":{}}}}]"#;
        assert_eq!(
            classify_body(body),
            FaucetOutcome::Fail { message: "Unknown error".to_string() }
        );
    }

    #[test]
    fn test_error_without_payload_is_server_error() {
        let body = r#"[{"error":{}}]"#;
        assert_eq!(
            classify_body(body),
            FaucetOutcome::ServerError { message: "Unknown error".to_string(), code: None }
        );
    }

    #[test]
    fn test_malformed_bodies_are_invalid() {
        for body in [
            "<html>502 Bad Gateway</html>",
            "[]",
            "{}",
            r#"[{"neither":true}]"#,
            r#"["string element"]"#,
            r#"[{"result":{"data":"not an object"}}]"#,
        ] {
            assert!(
                matches!(classify_body(body), FaucetOutcome::Invalid { .. }),
                "expected Invalid for {body}"
            );
        }
    }

    #[test]
    fn test_only_first_element_is_inspected() {
        let body = r#"[{"result":{"data":{"json":{"success":true,"transactionHash":"0x1"}}}}, 42]"#;
        assert!(classify_body(body).is_success());
    }
}
