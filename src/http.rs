//! JSON-over-HTTP calls with retry and exponential backoff.
//!
//! Shared by the OpenAI and Ollama embedding and chat providers:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use std::time::Duration;

use arag_bench_core::RagError;
use tracing::warn;

/// Delay before retry number `attempt` (1-based).
pub fn backoff_delay(attempt: u32) -> Duration {
    Duration::from_secs(1 << (attempt.saturating_sub(1)).min(5))
}

pub fn build_client(timeout_secs: u64) -> Result<reqwest::Client, RagError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| RagError::Provider(format!("failed to build HTTP client: {}", e)))
}

/// POST `body` to `url` and return the parsed JSON response.
///
/// `service` names the backend in error messages and logs.
pub async fn post_json_with_retry(
    client: &reqwest::Client,
    url: &str,
    bearer: Option<&str>,
    body: &serde_json::Value,
    max_retries: u32,
    service: &str,
) -> Result<serde_json::Value, RagError> {
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            tokio::time::sleep(backoff_delay(attempt)).await;
        }

        let mut request = client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body);
        if let Some(token) = bearer {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        match request.send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return response.json().await.map_err(|e| {
                        RagError::Provider(format!("{} returned invalid JSON: {}", service, e))
                    });
                }

                let body_text = response.text().await.unwrap_or_default();
                let message = format!("{} API error {}: {}", service, status, body_text);

                if status.as_u16() == 429 || status.is_server_error() {
                    warn!(service, attempt, status = status.as_u16(), "retryable provider error");
                    last_err = Some(message);
                    continue;
                }

                return Err(RagError::Provider(message));
            }
            Err(e) => {
                warn!(service, attempt, error = %e, "provider request failed");
                last_err = Some(format!("{} connection error at {}: {}", service, url, e));
                continue;
            }
        }
    }

    Err(RagError::Provider(last_err.unwrap_or_else(|| {
        format!("{} request failed after retries", service)
    })))
}
