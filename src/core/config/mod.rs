//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `THANKYOU_LOG_LEVEL` and `THANKYOU_BIND` env overrides.
//! API keys come from the environment only.
//!
//! # Module layout
//!
//! - **types** — Public configuration structs (`Config`, `AiConfigSettings`,
//!   `LlmConfig`, `Secrets`, …).
//! - **raw** — Raw TOML deserialization types. These mirror the file shape
//!   and use serde defaults; kept private.
//! - **load** — Loading logic: `merge_toml`, `load_raw_merged`, `load`,
//!   `load_from`, `expand_home`, `secret`.

mod load;
mod raw;
mod types;

pub use load::{expand_home, load, load_from, secret};
pub use types::*;

impl Config {
    /// `Config` for tests: static source, no API keys, unroutable URLs.
    pub fn test_default(static_path: &std::path::Path) -> Self {
        Self {
            service_name: "test".into(),
            log_level: "info".into(),
            bind: "127.0.0.1:0".into(),
            aiconfig: AiConfigSettings {
                key: raw::default_aiconfig_key(),
                advanced_options_flag: raw::default_advanced_options_flag(),
                source: SourceKind::Static,
                remote: RemoteSourceConfig {
                    base_url: "http://localhost:0".into(),
                    events_url: "http://localhost:0".into(),
                    timeout_seconds: 1,
                    flush_interval_seconds: 1,
                    event_capacity: 10,
                },
                static_source: StaticSourceConfig {
                    path: static_path.to_path_buf(),
                },
            },
            llm: LlmConfig {
                openai: OpenAiConfig {
                    api_base_url: "http://localhost:0/v1/chat/completions".into(),
                    timeout_seconds: 1,
                },
                anthropic: AnthropicConfig {
                    api_base_url: "http://localhost:0/v1/messages".into(),
                    api_version: raw::default_anthropic_api_version(),
                    timeout_seconds: 1,
                },
            },
            secrets: Secrets::default(),
        }
    }
}
