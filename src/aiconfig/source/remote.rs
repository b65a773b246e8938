//! HTTP evaluation against the remote configuration service.
//!
//! `POST {base_url}/evaluate` with `{"flagKey", "context"}`; the SDK key goes
//! in the `Authorization` header. `404` means the key does not exist.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::{Evaluation, SourceError};
use crate::aiconfig::Context;

#[derive(Debug, Clone)]
pub struct RemoteSource {
    client: Client,
    evaluate_url: String,
    sdk_key: String,
}

impl RemoteSource {
    pub fn new(base_url: &str, sdk_key: String, timeout_seconds: u64) -> Result<Self, SourceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .map_err(|e| SourceError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            evaluate_url: format!("{}/evaluate", base_url.trim_end_matches('/')),
            sdk_key,
        })
    }

    pub async fn evaluate(&self, key: &str, ctx: &Context) -> Result<Evaluation, SourceError> {
        debug!(flag_key = %key, context_key = %ctx.key(), "evaluating flag remotely");

        let response = self
            .client
            .post(&self.evaluate_url)
            .header(reqwest::header::AUTHORIZATION, &self.sdk_key)
            .json(&EvaluateRequest { flag_key: key, context: ctx })
            .send()
            .await
            .map_err(|e| SourceError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SourceError::FlagNotFound(key.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(flag_key = %key, %status, "flag evaluation rejected");
            return Err(SourceError::Transport(format!("HTTP {status}: {body}")));
        }

        let parsed = response
            .json::<EvaluateResponse>()
            .await
            .map_err(|e| SourceError::Malformed(e.to_string()))?;

        Ok(Evaluation {
            value: parsed.value,
            variation_key: parsed.variation_key,
            version: parsed.version,
        })
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateRequest<'a> {
    flag_key: &'a str,
    context: &'a Context,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EvaluateResponse {
    #[serde(default)]
    value: Value,
    #[serde(default)]
    variation_key: Option<String>,
    #[serde(default)]
    version: Option<u64>,
}
