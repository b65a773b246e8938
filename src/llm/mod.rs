//! LLM provider abstraction.
//!
//! `LlmProvider` is an enum over concrete provider implementations.
//! Add a new variant + module in `providers/` for each additional backend.
//!
//! Provider instances are shared immutable capabilities; clone them freely.
//! The model and its parameters arrive per call from the resolved AI config,
//! so a provider only owns its endpoint, credentials and HTTP client.

pub mod dispatch;
pub mod providers;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use dispatch::{Generation, Providers};

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider was selected but has no API key.
    #[error("{0}")]
    NotConfigured(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Messages ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One prompt message, in the order the provider should see it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self { role, content: content.into() }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }
}

// ── Responses ─────────────────────────────────────────────────────────────────

/// Token counts reported by the provider for a single call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u64,
    pub output_tokens: u64,
}

impl TokenUsage {
    pub fn total(&self) -> u64 {
        self.input_tokens + self.output_tokens
    }
}

#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub text: String,
    pub usage: Option<TokenUsage>,
}

// ── Parameters ────────────────────────────────────────────────────────────────

/// Typed view over the free-form `model.parameters` map of an AI config.
///
/// Only the keys the providers understand are extracted; values of the wrong
/// JSON type are ignored rather than rejected.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ModelParams {
    pub max_tokens: Option<u64>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
}

impl ModelParams {
    pub fn from_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            max_tokens: map.get("max_tokens").and_then(|v| {
                v.as_u64()
                    .or_else(|| v.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
            }),
            temperature: map.get("temperature").and_then(|v| v.as_f64()),
            top_p: map.get("top_p").and_then(|v| v.as_f64()),
        }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// Which calling convention a resolved config selects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Anthropic,
    Dummy,
}

impl ProviderKind {
    /// Map a provider name from the AI config. Unknown and missing names
    /// select OpenAI.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("anthropic") => ProviderKind::Anthropic,
            Some("dummy") => ProviderKind::Dummy,
            _ => ProviderKind::OpenAi,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Anthropic => "anthropic",
            ProviderKind::Dummy => "dummy",
        }
    }

    /// Human-facing name used in error messages.
    pub fn label(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
            ProviderKind::Dummy => "Dummy",
        }
    }

    /// Model used when the resolved config names none.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4",
            ProviderKind::Anthropic => "claude-3-sonnet-20240229",
            ProviderKind::Dummy => "echo",
        }
    }
}

/// All available provider backends.
///
/// Enum dispatch avoids `dyn` trait objects and the `async-trait` dependency.
/// Adding a backend = new module + new variant + new `complete` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    OpenAi(providers::openai::OpenAiProvider),
    Anthropic(providers::anthropic::AnthropicProvider),
    Dummy(providers::dummy::DummyProvider),
}

impl LlmProvider {
    /// Send the filled prompt to the provider and return its text reply.
    pub async fn complete(
        &self,
        model: &str,
        params: &ModelParams,
        messages: &[ChatMessage],
    ) -> Result<LlmResponse, ProviderError> {
        match self {
            LlmProvider::OpenAi(p) => p.complete(model, params, messages).await,
            LlmProvider::Anthropic(p) => p.complete(model, params, messages).await,
            LlmProvider::Dummy(p) => p.complete(model, params, messages).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn provider_kind_from_name() {
        assert_eq!(ProviderKind::from_name(Some("anthropic")), ProviderKind::Anthropic);
        assert_eq!(ProviderKind::from_name(Some("dummy")), ProviderKind::Dummy);
        assert_eq!(ProviderKind::from_name(Some("openai")), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::from_name(Some("mistral")), ProviderKind::OpenAi);
        assert_eq!(ProviderKind::from_name(None), ProviderKind::OpenAi);
    }

    #[test]
    fn default_models() {
        assert_eq!(ProviderKind::OpenAi.default_model(), "gpt-4");
        assert_eq!(ProviderKind::Anthropic.default_model(), "claude-3-sonnet-20240229");
    }

    #[test]
    fn params_extracts_known_keys() {
        let map = json!({ "max_tokens": 250, "temperature": 0.4, "top_p": 0.9, "seed": 7 });
        let p = ModelParams::from_map(map.as_object().unwrap());
        assert_eq!(p.max_tokens, Some(250));
        assert_eq!(p.temperature, Some(0.4));
        assert_eq!(p.top_p, Some(0.9));
    }

    #[test]
    fn params_ignores_wrong_types() {
        let map = json!({ "max_tokens": "lots", "temperature": "hot" });
        let p = ModelParams::from_map(map.as_object().unwrap());
        assert_eq!(p, ModelParams::default());
    }

    #[test]
    fn params_accepts_float_max_tokens() {
        let map = json!({ "max_tokens": 300.0 });
        let p = ModelParams::from_map(map.as_object().unwrap());
        assert_eq!(p.max_tokens, Some(300));
    }

    #[test]
    fn role_serializes_lowercase() {
        let m = ChatMessage::system("hi");
        assert_eq!(serde_json::to_value(&m).unwrap(), json!({ "role": "system", "content": "hi" }));
    }

    #[test]
    fn usage_total() {
        let u = TokenUsage { input_tokens: 12, output_tokens: 30 };
        assert_eq!(u.total(), 42);
    }
}
