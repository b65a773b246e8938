//! Flag evaluation backends.
//!
//! `ConfigSource` is an enum over concrete sources, the same way
//! `LlmProvider` is: one variant per backend, one `evaluate` arm each.
//! A source only answers "what is the value of this key for this context";
//! turning that value into an [`AiConfig`](super::AiConfig) is the client's job.

pub mod file;
pub mod remote;

use serde_json::Value;
use thiserror::Error;

use super::Context;

#[derive(Debug, Error)]
pub enum SourceError {
    /// The source cannot evaluate anything (e.g. missing SDK key).
    #[error("{0}")]
    NotConfigured(String),
    #[error("flag not found: {0}")]
    FlagNotFound(String),
    #[error("evaluation request failed: {0}")]
    Transport(String),
    #[error("malformed evaluation: {0}")]
    Malformed(String),
}

/// Raw result of evaluating one key.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub variation_key: Option<String>,
    pub version: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum ConfigSource {
    Remote(remote::RemoteSource),
    File(file::FileSource),
    /// Placeholder when no usable source could be built. Every evaluation
    /// fails with [`SourceError::NotConfigured`] carrying the reason.
    Unavailable(String),
}

impl ConfigSource {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigSource::Remote(_) => "remote",
            ConfigSource::File(_) => "static",
            ConfigSource::Unavailable(_) => "unavailable",
        }
    }

    pub async fn evaluate(&self, key: &str, ctx: &Context) -> Result<Evaluation, SourceError> {
        match self {
            ConfigSource::Remote(s) => s.evaluate(key, ctx).await,
            ConfigSource::File(s) => s.evaluate(key, ctx).await,
            ConfigSource::Unavailable(reason) => Err(SourceError::NotConfigured(reason.clone())),
        }
    }
}
