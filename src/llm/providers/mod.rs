//! LLM provider implementations.
//!
//! Each module owns its private wire types; callers only see
//! [`LlmResponse`](crate::llm::LlmResponse). Shared HTTP plumbing lives here.

pub mod anthropic;
pub mod dummy;
pub mod openai;

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::error;

use crate::llm::ProviderError;

/// Build the per-provider HTTP client with its request timeout.
pub(crate) fn http_client(timeout_seconds: u64) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_seconds))
        .build()
        .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))
}

// Error envelope shared by OpenAI and Anthropic: `{"error": {"message": ...}}`.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

/// Consume the response and return it if successful, or a structured error.
pub(crate) async fn check_status(
    provider: &str,
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(&body) {
        let code = env
            .error
            .code
            .map(|v| match v {
                serde_json::Value::String(s) => format!(" [code={s}]"),
                other => format!(" [code={other}]"),
            })
            .or_else(|| env.error.kind.map(|k| format!(" [type={k}]")))
            .unwrap_or_default();
        format!("HTTP {status}{code}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    };

    error!(%provider, %status, %message, "LLM request returned HTTP error");
    Err(ProviderError::Request(message))
}
