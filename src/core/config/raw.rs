//! Raw TOML deserialization types.
//!
//! These structs mirror the TOML file shape and use `serde` defaults.
//! The `load` module converts them into the public `types` structs.

use serde::Deserialize;

// ── Top-level ────────────────────────────────────────────────────────────────

/// Raw TOML shape — serde target before resolution.
#[derive(Deserialize)]
pub(super) struct RawConfig {
    #[serde(default)]
    pub service: RawService,
    #[serde(default)]
    pub aiconfig: RawAiConfig,
    #[serde(default)]
    pub llm: RawLlm,
}

#[derive(Deserialize)]
pub(super) struct RawService {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for RawService {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
            bind: default_bind(),
        }
    }
}

// ── AI config ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub(super) struct RawAiConfig {
    #[serde(default = "default_aiconfig_key")]
    pub key: String,
    #[serde(default = "default_advanced_options_flag")]
    pub advanced_options_flag: String,
    #[serde(default = "default_source")]
    pub source: String,
    #[serde(default)]
    pub remote: RawRemote,
    #[serde(rename = "static", default)]
    pub static_source: RawStatic,
}

impl Default for RawAiConfig {
    fn default() -> Self {
        Self {
            key: default_aiconfig_key(),
            advanced_options_flag: default_advanced_options_flag(),
            source: default_source(),
            remote: RawRemote::default(),
            static_source: RawStatic::default(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawRemote {
    #[serde(default = "default_remote_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub events_url: Option<String>,
    #[serde(default = "default_remote_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_flush_interval_seconds")]
    pub flush_interval_seconds: u64,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for RawRemote {
    fn default() -> Self {
        Self {
            base_url: default_remote_base_url(),
            events_url: None,
            timeout_seconds: default_remote_timeout_seconds(),
            flush_interval_seconds: default_flush_interval_seconds(),
            event_capacity: default_event_capacity(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawStatic {
    #[serde(default = "default_static_path")]
    pub path: String,
}

impl Default for RawStatic {
    fn default() -> Self {
        Self { path: default_static_path() }
    }
}

// ── LLM ──────────────────────────────────────────────────────────────────────

#[derive(Deserialize, Default)]
pub(super) struct RawLlm {
    #[serde(default)]
    pub openai: RawOpenAi,
    #[serde(default)]
    pub anthropic: RawAnthropic,
}

#[derive(Deserialize)]
pub(super) struct RawOpenAi {
    #[serde(default = "default_openai_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_llm_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawOpenAi {
    fn default() -> Self {
        Self {
            api_base_url: default_openai_api_base_url(),
            timeout_seconds: default_llm_timeout_seconds(),
        }
    }
}

#[derive(Deserialize)]
pub(super) struct RawAnthropic {
    #[serde(default = "default_anthropic_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_anthropic_api_version")]
    pub api_version: String,
    #[serde(default = "default_llm_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for RawAnthropic {
    fn default() -> Self {
        Self {
            api_base_url: default_anthropic_api_base_url(),
            api_version: default_anthropic_api_version(),
            timeout_seconds: default_llm_timeout_seconds(),
        }
    }
}

// ── Defaults ─────────────────────────────────────────────────────────────────

pub(super) fn default_service_name() -> String {
    "thankyou-bot".to_string()
}
pub(super) fn default_log_level() -> String {
    "info".to_string()
}
pub(super) fn default_bind() -> String {
    "0.0.0.0:8000".to_string()
}
pub(super) fn default_aiconfig_key() -> String {
    "thank-you-generator".to_string()
}
pub(super) fn default_advanced_options_flag() -> String {
    "enable-advanced-options".to_string()
}
pub(super) fn default_source() -> String {
    "remote".to_string()
}
pub(super) fn default_remote_base_url() -> String {
    "http://127.0.0.1:8030".to_string()
}
pub(super) fn default_remote_timeout_seconds() -> u64 {
    10
}
pub(super) fn default_flush_interval_seconds() -> u64 {
    5
}
pub(super) fn default_event_capacity() -> usize {
    100
}
pub(super) fn default_static_path() -> String {
    "ai_configs.toml".to_string()
}
pub(super) fn default_openai_api_base_url() -> String {
    "https://api.openai.com/v1/chat/completions".to_string()
}
pub(super) fn default_anthropic_api_base_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}
pub(super) fn default_anthropic_api_version() -> String {
    "2023-06-01".to_string()
}
pub(super) fn default_llm_timeout_seconds() -> u64 {
    60
}
