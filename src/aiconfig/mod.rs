//! Remote AI configuration — resolution, interpolation and tracking.
//!
//! [`AiConfigClient::config`] evaluates an AI config key for a [`Context`]
//! through a [`ConfigSource`] and returns the resolved [`AiConfig`] together
//! with an [`AiConfigTracker`] for reporting the outcome.
//!
//! Evaluation failures (transport errors, unknown keys, malformed values)
//! degrade to the caller's fallback config. A source that is not configured
//! at all is an error: there is no silent fallback for a missing SDK key.

mod context;
mod interpolate;
pub mod source;
mod tracker;

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::events::EventSink;
use crate::llm::ChatMessage;

pub use context::{Context, ContextBuilder};
pub use interpolate::render;
pub use source::{ConfigSource, Evaluation, SourceError};
pub use tracker::AiConfigTracker;

#[derive(Debug, Error)]
pub enum AiConfigError {
    #[error("AI config client not configured: {0}")]
    NotConfigured(String),
    #[error("invalid context: {0}")]
    InvalidContext(String),
}

// ── Resolved config ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    #[serde(default)]
    pub parameters: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProviderConfig {
    pub name: String,
}

/// Which model, provider and prompt messages a request should use.
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub enabled: bool,
    pub model: Option<ModelConfig>,
    pub provider: Option<ProviderConfig>,
    pub messages: Vec<ChatMessage>,
}

impl AiConfig {
    pub fn provider_name(&self) -> Option<&str> {
        self.provider.as_ref().map(|p| p.name.as_str())
    }

    pub fn model_name(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.name.as_str())
    }

    /// Model parameters, or an empty map when the config names no model.
    pub fn parameters(&self) -> Map<String, Value> {
        self.model.as_ref().map(|m| m.parameters.clone()).unwrap_or_default()
    }

    fn from_value(value: Value) -> Result<(Self, Meta), SourceError> {
        let raw: AiConfigValue =
            serde_json::from_value(value).map_err(|e| SourceError::Malformed(e.to_string()))?;
        let meta = raw.meta.unwrap_or_default();
        let config = AiConfig {
            enabled: meta.enabled,
            model: raw.model,
            provider: raw.provider,
            messages: raw.messages.unwrap_or_default(),
        };
        Ok((config, meta))
    }
}

// Wire shape of an AI config flag value.
#[derive(Deserialize)]
struct AiConfigValue {
    #[serde(rename = "_ldMeta", default)]
    meta: Option<Meta>,
    #[serde(default)]
    model: Option<ModelConfig>,
    #[serde(default)]
    provider: Option<ProviderConfig>,
    #[serde(default)]
    messages: Option<Vec<ChatMessage>>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Meta {
    #[serde(default)]
    enabled: bool,
    #[serde(default)]
    variation_key: Option<String>,
    #[serde(default)]
    version: Option<u64>,
}

// ── Client ────────────────────────────────────────────────────────────────────

/// Shared handle to the configuration service. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AiConfigClient {
    source: ConfigSource,
    sink: EventSink,
}

impl AiConfigClient {
    pub fn new(source: ConfigSource, sink: EventSink) -> Self {
        Self { source, sink }
    }

    pub fn source_name(&self) -> &'static str {
        self.source.name()
    }

    /// Resolve `key` for `ctx`, falling back to `fallback` when evaluation fails.
    ///
    /// Message contents are rendered with `{{name}}` interpolation over
    /// `variables` and `{{ldctx.*}}` context attributes.
    pub async fn config(
        &self,
        key: &str,
        ctx: &Context,
        fallback: AiConfig,
        variables: &BTreeMap<String, String>,
    ) -> Result<(AiConfig, AiConfigTracker), AiConfigError> {
        let (mut config, variation_key, version) = match self.source.evaluate(key, ctx).await {
            Ok(eval) => match AiConfig::from_value(eval.value) {
                Ok((config, meta)) => {
                    let variation_key = meta.variation_key.or(eval.variation_key);
                    let version = meta.version.or(eval.version);
                    debug!(
                        config_key = %key,
                        variation = ?variation_key,
                        enabled = config.enabled,
                        provider = ?config.provider_name(),
                        model = ?config.model_name(),
                        "AI config resolved"
                    );
                    (config, variation_key, version)
                }
                Err(e) => {
                    warn!(config_key = %key, error = %e, "AI config value malformed — using fallback");
                    (fallback, None, None)
                }
            },
            Err(SourceError::NotConfigured(reason)) => {
                return Err(AiConfigError::NotConfigured(reason));
            }
            Err(e) => {
                warn!(config_key = %key, error = %e, "AI config evaluation failed — using fallback");
                (fallback, None, None)
            }
        };

        for message in &mut config.messages {
            message.content = render(&message.content, variables, ctx);
        }

        let tracker = AiConfigTracker::new(
            self.sink.clone(),
            key,
            variation_key,
            version,
            ctx.kind(),
            ctx.key(),
        );
        Ok((config, tracker))
    }

    /// Evaluate a boolean feature flag. Non-boolean values and evaluation
    /// failures yield `default`.
    pub async fn variation_bool(&self, key: &str, ctx: &Context, default: bool) -> Result<bool, AiConfigError> {
        match self.source.evaluate(key, ctx).await {
            Ok(eval) => match eval.value {
                Value::Bool(b) => Ok(b),
                other => {
                    warn!(flag_key = %key, value = %other, "flag value is not a boolean — using default");
                    Ok(default)
                }
            },
            Err(SourceError::NotConfigured(reason)) => Err(AiConfigError::NotConfigured(reason)),
            Err(e) => {
                warn!(flag_key = %key, error = %e, "flag evaluation failed — using default");
                Ok(default)
            }
        }
    }
}
