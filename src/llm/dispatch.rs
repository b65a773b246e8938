//! Provider dispatch — routes a resolved AI config to the matching provider.

use tracing::{debug, info};

use super::providers::{anthropic::AnthropicProvider, dummy::DummyProvider, openai::OpenAiProvider};
use super::{ChatMessage, LlmProvider, LlmResponse, ModelParams, ProviderError, ProviderKind};
use crate::aiconfig::AiConfig;
use crate::config::{LlmConfig, Secrets};

/// Outcome of one dispatched generation.
#[derive(Debug, Clone)]
pub struct Generation {
    pub provider: ProviderKind,
    /// Model actually requested (config value or the provider default).
    pub model: String,
    pub response: LlmResponse,
}

/// The provider clients available to this process.
///
/// OpenAI and Anthropic exist only when their API key is set; the dummy
/// provider is always available.
#[derive(Debug, Clone)]
pub struct Providers {
    openai: Option<LlmProvider>,
    anthropic: Option<LlmProvider>,
    dummy: LlmProvider,
}

impl Providers {
    pub fn from_config(llm: &LlmConfig, secrets: &Secrets) -> Result<Self, ProviderError> {
        let openai = match &secrets.openai_api_key {
            Some(key) => Some(LlmProvider::OpenAi(OpenAiProvider::new(
                llm.openai.api_base_url.clone(),
                llm.openai.timeout_seconds,
                key.clone(),
            )?)),
            None => None,
        };
        let anthropic = match &secrets.anthropic_api_key {
            Some(key) => Some(LlmProvider::Anthropic(AnthropicProvider::new(
                llm.anthropic.api_base_url.clone(),
                llm.anthropic.api_version.clone(),
                llm.anthropic.timeout_seconds,
                key.clone(),
            )?)),
            None => None,
        };

        info!(
            openai = openai.is_some(),
            anthropic = anthropic.is_some(),
            "LLM providers initialised"
        );

        Ok(Self { openai, anthropic, dummy: LlmProvider::Dummy(DummyProvider) })
    }

    pub fn is_configured(&self, kind: ProviderKind) -> bool {
        self.get(kind).is_ok()
    }

    pub fn get(&self, kind: ProviderKind) -> Result<&LlmProvider, ProviderError> {
        let provider = match kind {
            ProviderKind::OpenAi => self.openai.as_ref(),
            ProviderKind::Anthropic => self.anthropic.as_ref(),
            ProviderKind::Dummy => Some(&self.dummy),
        };
        provider.ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "{} API client not configured - cannot proceed without it",
                kind.label()
            ))
        })
    }

    /// Send `messages` to the provider the config selects, with the config's
    /// model and parameters.
    pub async fn dispatch(&self, config: &AiConfig, messages: &[ChatMessage]) -> Result<Generation, ProviderError> {
        let kind = ProviderKind::from_name(config.provider_name());
        let model = config.model_name().unwrap_or(kind.default_model()).to_string();
        let params = ModelParams::from_map(&config.parameters());

        debug!(provider = kind.as_str(), %model, messages = messages.len(), "dispatching generation");

        let provider = self.get(kind)?;
        let response = provider.complete(&model, &params, messages).await?;
        Ok(Generation { provider: kind, model, response })
    }
}
