//! Public configuration types.
//!
//! These are the resolved, ready-to-use structs the service consumes.
//! Raw TOML deserialization types live in `raw.rs`.

use std::path::PathBuf;

// ── AI config source ─────────────────────────────────────────────────────────

/// Which backend evaluates AI configs and feature flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// HTTP evaluation against the remote configuration service.
    Remote,
    /// Local TOML file for offline development and tests.
    Static,
}

impl SourceKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "remote" => Some(Self::Remote),
            "static" => Some(Self::Static),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Static => "static",
        }
    }
}

/// Remote configuration service endpoints.
/// Populated from `[aiconfig.remote]` in the TOML.
#[derive(Debug, Clone)]
pub struct RemoteSourceConfig {
    /// Base URL for flag evaluation (`{base_url}/evaluate`).
    pub base_url: String,
    /// Base URL for analytics events (`{events_url}/bulk`).
    pub events_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
    /// How often buffered analytics events are flushed.
    pub flush_interval_seconds: u64,
    /// Batch size that triggers an early flush.
    pub event_capacity: usize,
}

/// Local file source. Populated from `[aiconfig.static]`.
#[derive(Debug, Clone)]
pub struct StaticSourceConfig {
    /// Already expanded; relative paths are resolved against the config file.
    pub path: PathBuf,
}

/// `[aiconfig]` — which config key drives generation and where it is evaluated.
#[derive(Debug, Clone)]
pub struct AiConfigSettings {
    /// AI config key evaluated for every generation request.
    pub key: String,
    /// Boolean flag gating the advanced form options.
    pub advanced_options_flag: String,
    pub source: SourceKind,
    pub remote: RemoteSourceConfig,
    pub static_source: StaticSourceConfig,
}

// ── LLM ──────────────────────────────────────────────────────────────────────

/// OpenAI chat completions endpoint. Populated from `[llm.openai]`.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// Full chat completions endpoint URL.
    pub api_base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub timeout_seconds: u64,
}

/// Anthropic messages endpoint. Populated from `[llm.anthropic]`.
#[derive(Debug, Clone)]
pub struct AnthropicConfig {
    /// Full messages endpoint URL.
    pub api_base_url: String,
    /// Value sent in the `anthropic-version` header.
    pub api_version: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub openai: OpenAiConfig,
    pub anthropic: AnthropicConfig,
}

// ── Secrets ──────────────────────────────────────────────────────────────────

/// API keys. Sourced from env only, never from TOML.
///
/// Unset, empty, and template placeholder values (`your_..._here`) all
/// resolve to `None`.
#[derive(Clone, Default)]
pub struct Secrets {
    pub sdk_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
}

impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("sdk_key", &self.sdk_key.as_ref().map(|_| "<set>"))
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<set>"))
            .field("anthropic_api_key", &self.anthropic_api_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

// ── Config (root) ────────────────────────────────────────────────────────────

/// Fully-resolved service configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub service_name: String,
    pub log_level: String,
    /// Socket address the HTTP listener binds to.
    pub bind: String,
    pub aiconfig: AiConfigSettings,
    pub llm: LlmConfig,
    pub secrets: Secrets,
}
