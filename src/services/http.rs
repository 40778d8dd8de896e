//! Shared HTTP plumbing for the external service clients

use std::time::Duration;

use reqwest::{RequestBuilder, Response, StatusCode};

use crate::error::{Error, Result};

const MAX_RETRIES: u32 = 5;

/// Send a request, retrying with bounded exponential backoff on 429
/// responses only. Every other failure is returned to the caller, which
/// scopes it to the one sub-operation that was in flight.
pub async fn send_with_backoff(request: RequestBuilder) -> Result<Response> {
    let mut attempt: u32 = 0;
    loop {
        let cloned = request
            .try_clone()
            .ok_or_else(|| Error::Transport("request body is not retryable".to_string()))?;

        let response = cloned
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if response.status() == StatusCode::TOO_MANY_REQUESTS && attempt < MAX_RETRIES {
            let wait = Duration::from_secs(1 << attempt);
            tracing::warn!(
                wait_secs = wait.as_secs(),
                attempt = attempt + 1,
                max = MAX_RETRIES,
                "Rate limited (429), backing off"
            );
            tokio::time::sleep(wait).await;
            attempt += 1;
            continue;
        }

        return Ok(response);
    }
}

/// Reject non-2xx responses, folding the body into the error message.
pub async fn check_status(response: Response, context: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(Error::Transport(format!(
        "{} failed with {}: {}",
        context, status, body
    )))
}

/// Build the shared reqwest client with a request timeout.
pub fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(concat!("cadencer/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(30))
        .build()
        .map_err(|e| Error::Transport(e.to_string()))
}
