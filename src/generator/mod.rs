//! Generation pipeline behind each endpoint: build the context, resolve the
//! AI config, fill the templates, dispatch, then track the outcome.

pub mod contexts;
mod request;

use std::collections::BTreeMap;
use std::time::Instant;

use serde_json::Map;
use thiserror::Error;
use tracing::{error, info, instrument};

use crate::aiconfig::{AiConfig, AiConfigClient, AiConfigError, AiConfigTracker, Context, ModelConfig, ProviderConfig};
use crate::llm::{ChatMessage, ProviderError, ProviderKind, Providers};
use crate::template::build_personalized_messages;

pub use request::{ConfigSmokeTest, ConfigStatus, GenerationMetadata, ThankYouRequest, ThankYouResponse};

const FALLBACK_VARIATION: &str = "fallback";
const SMOKE_TEST_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Error)]
pub enum GenerateError {
    /// The request body failed validation.
    #[error("{0}")]
    Invalid(String),
    #[error("AI Config is currently disabled")]
    Disabled,
    #[error(transparent)]
    AiConfig(#[from] AiConfigError),
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Config used when the configuration service cannot serve one.
pub fn fallback_config() -> AiConfig {
    let mut parameters = Map::new();
    parameters.insert("temperature".into(), 0.8.into());
    AiConfig {
        enabled: true,
        model: Some(ModelConfig { name: "gpt-4".into(), parameters }),
        provider: Some(ProviderConfig { name: "openai".into() }),
        messages: vec![ChatMessage::system("You are a helpful assistant for writing thank you notes.")],
    }
}

/// `{{name}}` variables supplied at resolution time.
pub fn default_variables() -> BTreeMap<String, String> {
    [
        ("gift_description", "beautiful wedding gift"),
        ("gift_giver_name", "dear friend"),
        ("relationship", "close friend"),
        ("additional_notes", "thank you for celebrating with us"),
        ("next_meeting", "at Christmas dinner"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

/// Everything a request handler needs. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Generator {
    client: AiConfigClient,
    providers: Providers,
    config_key: String,
    advanced_options_flag: String,
}

impl Generator {
    pub fn new(
        client: AiConfigClient,
        providers: Providers,
        config_key: impl Into<String>,
        advanced_options_flag: impl Into<String>,
    ) -> Self {
        Self {
            client,
            providers,
            config_key: config_key.into(),
            advanced_options_flag: advanced_options_flag.into(),
        }
    }

    pub fn advanced_options_flag(&self) -> &str {
        &self.advanced_options_flag
    }

    async fn resolve(&self, ctx: &Context) -> Result<(AiConfig, AiConfigTracker), AiConfigError> {
        self.client
            .config(&self.config_key, ctx, fallback_config(), &default_variables())
            .await
    }

    /// Produce a thank-you note for one guest.
    #[instrument(skip_all, fields(giver = %request.gift_giver_name))]
    pub async fn generate(&self, request: &ThankYouRequest) -> Result<ThankYouResponse, GenerateError> {
        request.validate().map_err(GenerateError::Invalid)?;

        let ctx = contexts::generation(request)?;
        let (config, tracker) = self.resolve(&ctx).await?;

        if !config.enabled {
            tracker.track_error();
            info!(config_key = %self.config_key, "AI config disabled, refusing generation");
            return Err(GenerateError::Disabled);
        }

        let messages = build_personalized_messages(request, &config);

        let started = Instant::now();
        let generation = match self.providers.dispatch(&config, &messages).await {
            Ok(g) => g,
            Err(e) => {
                tracker.track_error();
                error!(error = %e, "generation failed");
                return Err(e.into());
            }
        };

        tracker.track_duration(started.elapsed());
        if let Some(usage) = generation.response.usage {
            tracker.track_tokens(usage);
        }
        tracker.track_success();

        let variation_name = tracker.variation_key().unwrap_or(FALLBACK_VARIATION).to_string();
        let provider = generation.provider.as_str();
        info!(provider, model = %generation.model, variation = %variation_name, "thank-you note generated");

        Ok(ThankYouResponse {
            thank_you_note: generation.response.text,
            ai_model_used: format!("{provider}:{}", generation.model),
            prompt_strategy: variation_name.clone(),
            generation_metadata: GenerationMetadata {
                provider: provider.to_string(),
                model_parameters: config.parameters(),
                ai_config_key: tracker.config_key().to_string(),
                variation_name,
                config_enabled: config.enabled,
            },
        })
    }

    /// Which variation, provider and model are currently served.
    pub async fn status(&self) -> Result<ConfigStatus, AiConfigError> {
        let (config, tracker) = self.resolve(&contexts::status()?).await?;
        let advanced_options_enabled = self
            .client
            .variation_bool(&self.advanced_options_flag, &contexts::status_flag()?, false)
            .await?;

        let variation_name = tracker.variation_key().unwrap_or(FALLBACK_VARIATION).to_string();
        Ok(ConfigStatus {
            status: if config.enabled { "active" } else { "disabled" },
            current_provider: config.provider_name().unwrap_or("unknown").to_string(),
            current_model: config.model_name().unwrap_or("unknown").to_string(),
            prompt_strategy: variation_name.clone(),
            ai_config_key: tracker.config_key().to_string(),
            advanced_options_enabled,
            config_enabled: config.enabled,
            variation_name,
        })
    }

    /// Whether the form's advanced options are shown, for an anonymous visitor.
    pub async fn advanced_options(&self) -> Result<bool, AiConfigError> {
        self.client
            .variation_bool(&self.advanced_options_flag, &contexts::anonymous()?, false)
            .await
    }

    /// Resolve the config for the test context, fill it with sample data and,
    /// when the selected provider is configured, generate a short preview.
    pub async fn test_generate(&self) -> Result<ConfigSmokeTest, GenerateError> {
        let (config, _tracker) = self.resolve(&contexts::test_generate()?).await?;

        let request = ThankYouRequest::sample();
        let messages = build_personalized_messages(&request, &config);

        let kind = ProviderKind::from_name(config.provider_name());
        let generation_test = if self.providers.is_configured(kind) {
            let generation = self.providers.dispatch(&config, &messages).await?;
            preview(&generation.response.text)
        } else {
            format!("{} client not initialized - check API key", kind.label())
        };

        Ok(ConfigSmokeTest {
            enabled: config.enabled,
            provider: config.provider_name().unwrap_or("unknown").to_string(),
            model: config.model_name().unwrap_or("unknown").to_string(),
            model_params: config.parameters(),
            messages_count: config.messages.len(),
            tracker_available: true,
            messages_built: messages.len(),
            generation_test,
        })
    }
}

fn preview(text: &str) -> String {
    if text.chars().count() > SMOKE_TEST_PREVIEW_CHARS {
        let head: String = text.chars().take(SMOKE_TEST_PREVIEW_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
