//! Dummy LLM provider — echoes the last user message prefixed with `[echo]`.
//! Selected by `provider.name = "dummy"`; needs no API key.

use crate::llm::{ChatMessage, LlmResponse, ModelParams, ProviderError, Role};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(
        &self,
        _model: &str,
        _params: &ModelParams,
        messages: &[ChatMessage],
    ) -> Result<LlmResponse, ProviderError> {
        let last_user = messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        Ok(LlmResponse {
            text: format!("[echo] {last_user}"),
            usage: None,
        })
    }
}
