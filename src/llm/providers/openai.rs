//! OpenAI chat completion provider (`/v1/chat/completions`).
//!
//! All OpenAI wire types are private to this module. The provider is
//! stateless: one round-trip per call, model and parameters supplied by the
//! caller from the resolved AI config.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

use crate::llm::{ChatMessage, LlmResponse, ModelParams, ProviderError, TokenUsage};

use super::{check_status, http_client};

/// Used when the config does not set `max_tokens`.
const DEFAULT_MAX_TOKENS: u64 = 300;
/// Sampling defaults of the API itself. Values equal to these are not sent,
/// because some models reject any explicit sampling parameter.
const API_DEFAULT_TEMPERATURE: f64 = 1.0;
const API_DEFAULT_TOP_P: f64 = 1.0;

/// Adapter for any HTTP endpoint implementing `/v1/chat/completions`.
///
/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Debug, Clone)]
pub struct OpenAiProvider {
    client: Client,
    api_base_url: String,
    api_key: String,
}

impl OpenAiProvider {
    /// `api_key` is sent as `Authorization: Bearer <key>` on every request.
    pub fn new(api_base_url: String, timeout_seconds: u64, api_key: String) -> Result<Self, ProviderError> {
        let client = http_client(timeout_seconds)?;
        Ok(Self { client, api_base_url, api_key })
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
            max_completion_tokens = payload.max_completion_tokens,
            temperature = ?payload.temperature,
            top_p = ?payload.top_p,
            "sending OpenAI request"
        );
        if tracing::enabled!(tracing::Level::TRACE) {
            let json = serde_json::to_string_pretty(&payload)
                .unwrap_or_else(|e| format!("<serialization failed: {e}>"));
            trace!(payload = %json, "full OpenAI request payload");
        }

        let response = self
            .client
            .post(&self.api_base_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(url = %self.api_base_url, error = %e, "OpenAI HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status("openai", response).await?;

        let parsed = response.json::<ChatCompletionResponse>().await.map_err(|e| {
            error!(error = %e, "failed to deserialize OpenAI response");
            ProviderError::Request(format!("failed to parse response body: {e}"))
        })?;

        debug!(choices = parsed.choices.len(), "received OpenAI response");

        let text = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ProviderError::Request("empty or missing content in response".into()))?;

        let usage = parsed.usage.map(|u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });

        Ok(LlmResponse { text, usage })
    }
}

fn build_request(model: &str, params: &ModelParams, messages: &[ChatMessage]) -> ChatCompletionRequest {
    let temperature = params.temperature.unwrap_or(API_DEFAULT_TEMPERATURE);
    let top_p = params.top_p.unwrap_or(API_DEFAULT_TOP_P);

    ChatCompletionRequest {
        model: model.to_string(),
        messages: messages
            .iter()
            .map(|m| Message {
                role: m.role.as_str(),
                content: m.content.clone(),
            })
            .collect(),
        max_completion_tokens: params.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
        temperature: (temperature != API_DEFAULT_TEMPERATURE).then_some(temperature),
        top_p: (top_p != API_DEFAULT_TOP_P).then_some(top_p),
    }
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    max_completion_tokens: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsageData>,
}

#[derive(Debug, Deserialize)]
struct UsageData {
    prompt_tokens: u64,
    completion_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    use super::*;
    use crate::test_support::serve;

    fn messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("You write thank-you notes."),
            ChatMessage::user("Thank Aunt Sarah for the vase."),
        ]
    }

    #[test]
    fn request_defaults_omit_sampling_params() {
        let req = build_request("gpt-4", &ModelParams::default(), &messages());
        let v = serde_json::to_value(&req).unwrap();
        assert_eq!(v["max_completion_tokens"], 300);
        assert!(v.get("temperature").is_none());
        assert!(v.get("top_p").is_none());
        assert_eq!(v["messages"][0]["role"], "system");
        assert_eq!(v["messages"][1]["role"], "user");
    }

    #[test]
    fn request_sends_non_default_sampling_params() {
        let params = ModelParams { max_tokens: Some(120), temperature: Some(0.8), top_p: Some(0.5) };
        let v = serde_json::to_value(build_request("gpt-4o", &params, &messages())).unwrap();
        assert_eq!(v["model"], "gpt-4o");
        assert_eq!(v["max_completion_tokens"], 120);
        assert_eq!(v["temperature"], 0.8);
        assert_eq!(v["top_p"], 0.5);
    }

    #[test]
    fn request_omits_explicit_default_temperature() {
        let params = ModelParams { temperature: Some(1.0), top_p: Some(1.0), ..Default::default() };
        let v = serde_json::to_value(build_request("gpt-4", &params, &messages())).unwrap();
        assert!(v.get("temperature").is_none());
        assert!(v.get("top_p").is_none());
    }

    #[tokio::test]
    async fn complete_round_trip() {
        let seen: Arc<Mutex<Option<(HeaderMap, Value)>>> = Arc::default();
        let captured = seen.clone();
        let router = Router::new().route(
            "/v1/chat/completions",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = Some((headers, body));
                    Json(json!({
                        "choices": [{ "message": { "content": "  Dear Aunt Sarah, thank you!  " } }],
                        "usage": { "prompt_tokens": 20, "completion_tokens": 8 }
                    }))
                }
            }),
        );
        let base = serve(router).await;

        let p = OpenAiProvider::new(format!("{base}/v1/chat/completions"), 5, "sk-test".into()).unwrap();
        let resp = p.complete("gpt-4", &ModelParams::default(), &messages()).await.unwrap();

        assert_eq!(resp.text, "Dear Aunt Sarah, thank you!");
        assert_eq!(resp.usage, Some(TokenUsage { input_tokens: 20, output_tokens: 8 }));

        let (headers, body) = seen.lock().unwrap().take().unwrap();
        assert_eq!(headers["authorization"], "Bearer sk-test");
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn http_error_surfaces_envelope_message() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({ "error": { "message": "Incorrect API key", "code": "invalid_api_key" } })),
                )
            }),
        );
        let base = serve(router).await;

        let p = OpenAiProvider::new(format!("{base}/v1/chat/completions"), 5, "bad".into()).unwrap();
        let err = p.complete("gpt-4", &ModelParams::default(), &messages()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("401"));
        assert!(msg.contains("invalid_api_key"));
        assert!(msg.contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn empty_content_is_an_error() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({ "choices": [{ "message": { "content": null } }] })) }),
        );
        let base = serve(router).await;

        let p = OpenAiProvider::new(format!("{base}/v1/chat/completions"), 5, "k".into()).unwrap();
        let err = p.complete("gpt-4", &ModelParams::default(), &messages()).await.unwrap_err();
        assert!(err.to_string().contains("empty or missing content"));
    }
}
