//! Outbound HTTP helpers.
//!
//! Every outbound call in Lumina goes through a client built here so that
//! no request can run without a timeout.

use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Default User-Agent for outbound calls.
pub const DEFAULT_USER_AGENT: &str = concat!("lumina/", env!("CARGO_PKG_VERSION"));

/// Build a `reqwest::Client` with a hard per-request timeout.
pub fn build_client(timeout: Duration, user_agent: &str) -> AppResult<reqwest::Client> {
    let user_agent = if user_agent.trim().is_empty() {
        DEFAULT_USER_AGENT
    } else {
        user_agent
    };

    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(timeout)
        .user_agent(user_agent)
        .build()
        .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-2xx response into `AppError::Upstream`, keeping the body for logs.
pub async fn ensure_success(response: reqwest::Response) -> AppResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    Err(AppError::Upstream {
        status: status.as_u16(),
        body: truncate_for_log(&body, 512),
    })
}

/// Clip a body to `max_chars` characters for log output.
pub fn truncate_for_log(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        return body.to_string();
    }
    let mut clipped: String = body.chars().take(max_chars).collect();
    clipped.push_str("...");
    clipped
}
