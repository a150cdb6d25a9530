//! Shared HTTP client construction, SSE parsing, and status mapping.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};

use crate::error::HarvestError;

/// Build a client with the request timeout applied to the whole exchange,
/// streamed body included.
pub fn build_client(timeout: Duration) -> Result<reqwest::Client, HarvestError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| HarvestError::Configuration(format!("failed to build HTTP client: {e}")))
}

/// Build default headers for a Bearer-token API.
pub fn bearer_headers(api_key: Option<&str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(
        ACCEPT,
        HeaderValue::from_static("text/event-stream, application/json"),
    );
    if let Some(key) = api_key {
        if let Ok(val) = HeaderValue::from_str(&format!("Bearer {key}")) {
            headers.insert(AUTHORIZATION, val);
        }
    }
    headers
}

/// Parse an SSE "data:" line, returning None for "[DONE]".
pub fn parse_sse_data(line: &str) -> Option<&str> {
    let data = line
        .strip_prefix("data: ")
        .or_else(|| line.strip_prefix("data:"))?;
    if data == "[DONE]" {
        return None;
    }
    Some(data)
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> HarvestError {
    match status {
        401 | 403 => HarvestError::Authentication(body.to_string()),
        429 => HarvestError::RateLimited {
            retry_after_ms: extract_retry_after(body),
        },
        _ => HarvestError::api(status, body),
    }
}

/// Timeouts get their own variant; everything else stays a network error.
pub fn network_error(error: reqwest::Error, timeout: Duration) -> HarvestError {
    if error.is_timeout() {
        HarvestError::Timeout(timeout.as_millis() as u64)
    } else {
        HarvestError::Network(error)
    }
}

fn extract_retry_after(body: &str) -> Option<u64> {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("retryAfterSeconds")
                .or_else(|| v.get("error").and_then(|e| e.get("retry_after")))
                .and_then(|r| r.as_f64())
                .map(|s| (s * 1000.0) as u64)
        })
}
