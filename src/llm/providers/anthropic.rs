//! Anthropic messages provider (`/v1/messages`).
//!
//! System messages are lifted out of the conversation into the top-level
//! `system` field; the last system message wins. Everything else keeps its
//! order.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{ChatMessage, LlmResponse, ModelParams, ProviderError, Role, TokenUsage};

use super::{check_status, http_client};

const DEFAULT_MAX_TOKENS: u64 = 300;
const DEFAULT_TEMPERATURE: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct AnthropicProvider {
    client: Client,
    api_base_url: String,
    api_version: String,
    api_key: String,
}

impl AnthropicProvider {
    /// `api_key` goes in `x-api-key`, `api_version` in `anthropic-version`.
    pub fn new(
        api_base_url: String,
        api_version: String,
        timeout_seconds: u64,
        api_key: String,
    ) -> Result<Self, ProviderError> {
        let client = http_client(timeout_seconds)?;
        Ok(Self { client, api_base_url, api_version, api_key })
    }

    pub async fn complete(
        &self,
        model: &str,
        params: &ModelParams,
        messages: &[ChatMessage],
    ) -> Result<LlmResponse, ProviderError> {
        let payload = build_request(model, params, messages);

        debug!(
            model = %payload.model,
            messages = payload.messages.len(),
            has_system = payload.system.is_some(),
            max_tokens = payload.max_tokens,
            temperature = payload.temperature,
            "sending Anthropic request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full Anthropic request payload");
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_base_url, error = %e, "Anthropic HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status("anthropic", response).await?;

        let parsed = response.json::<MessagesResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize Anthropic response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(blocks = parsed.content.len(), "received Anthropic response");

        let text = parsed
            .content
            .into_iter()
            .find(|b| b.kind == "text")
            .and_then(|b| b.text)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProviderError::Request("empty or missing text block in response".into()))?;

        let usage = parsed.usage.map(|u| TokenUsage {
            input_tokens: u.input_tokens,
            output_tokens: u.output_tokens,
        });

        Ok(LlmResponse { text, usage })
    }
}

fn build_request(model: &str, params: &ModelParams, messages: &[ChatMessage]) -> MessagesRequest {
    let mut system = None;
    let mut turns = Vec::with_capacity(messages.len());
    for m in messages {
        match m.role {
            Role::System => system = Some(m.content.clone()),
            Role::User | Role::Assistant => turns.push(Message {
                role: m.role.as_str(),
                content: m.content.clone(),
            }),
        }
    }

    MessagesRequest {
        model: model.to_string(),
        max_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        temperature: params.temperature.unwrap_or(DEFAULT_TEMPERATURE),
        system: system.filter(|s| !s.is_empty()),
        messages: turns,
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u64,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<UsageData>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsageData {
    input_tokens: u64,
    output_tokens: u64,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    use super::*;
    use crate::test_support::serve;

    #[test]
    fn system_messages_lifted_last_wins() {
        let msgs = vec![
            ChatMessage::system("first persona"),
            ChatMessage::user("hello"),
            ChatMessage::system("second persona"),
            ChatMessage::new(Role::Assistant, "hi"),
            ChatMessage::user("write the note"),
        ];
        let req = build_request("claude-x", &ModelParams::default(), &msgs);
        assert_eq!(req.system.as_deref(), Some("second persona"));
        let roles: Vec<_> = req.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec!["user", "assistant", "user"]);
    }

    #[test]
    fn defaults_applied() {
        let req = build_request("claude-x", &ModelParams::default(), &[ChatMessage::user("x")]);
        assert_eq!(req.max_tokens, 300);
        assert_eq!(req.temperature, 0.7);
        assert!(req.system.is_none());
        let v = serde_json::to_value(&req).unwrap();
        assert!(v.get("system").is_none());
    }

    #[test]
    fn params_override_defaults() {
        let params = ModelParams { max_tokens: Some(512), temperature: Some(1.0), top_p: Some(0.3) };
        let req = build_request("claude-x", &params, &[ChatMessage::user("x")]);
        assert_eq!(req.max_tokens, 512);
        assert_eq!(req.temperature, 1.0);
    }

    #[tokio::test]
    async fn complete_round_trip() {
        let seen: Arc<Mutex<Option<(HeaderMap, Value)>>> = Arc::default();
        let captured = seen.clone();
        let router = Router::new().route(
            "/v1/messages",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some((headers, body));
                    Json(json!({
                        "content": [{ "type": "text", "text": "Dearest Sarah, the vase is lovely." }],
                        "usage": { "input_tokens": 31, "output_tokens": 9 }
                    }))
                }
            }),
        );
        let base = serve(router).await;

        let p = AnthropicProvider::new(
            format!("{base}/v1/messages"),
            "2023-06-01".into(),
            5,
            "sk-ant-test".into(),
        )
        .unwrap();
        let msgs = vec![ChatMessage::system("persona"), ChatMessage::user("write")];
        let resp = p.complete("claude-3-haiku", &ModelParams::default(), &msgs).await.unwrap();

        assert_eq!(resp.text, "Dearest Sarah, the vase is lovely.");
        assert_eq!(resp.usage.unwrap().total(), 40);

        let (headers, body) = seen.lock().unwrap().take().unwrap();
        assert_eq!(headers["x-api-key"], "sk-ant-test");
        assert_eq!(headers["anthropic-version"], "2023-06-01");
        assert_eq!(body["system"], "persona");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn overloaded_error_reports_type() {
        let router = Router::new().route(
            "/v1/messages",
            post(|| async {
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    Json(json!({
                        "type": "error",
                        "error": { "type": "overloaded_error", "message": "Overloaded" }
                    })),
                )
            }),
        );
        let base = serve(router).await;

        let p = AnthropicProvider::new(format!("{base}/v1/messages"), "2023-06-01".into(), 5, "k".into())
            .unwrap();
        let err = p
            .complete("claude", &ModelParams::default(), &[ChatMessage::user("x")])
            .await
            .unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("503"));
        assert!(msg.contains("overloaded_error"));
        assert!(msg.contains("Overloaded"));
    }
}
