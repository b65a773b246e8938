//! Local TOML source for offline development and tests.
//!
//! The file is re-read on every evaluation so edits take effect without a
//! restart. Shape:
//!
//! ```toml
//! [flags]
//! enable-advanced-options = true
//!
//! [configs.thank-you-generator]
//! enabled = true
//! variation = "warm-openai"
//! version = 1
//! provider = { name = "openai" }
//! model = { name = "gpt-4o", parameters = { temperature = 0.8 } }
//!
//! [[configs.thank-you-generator.messages]]
//! role = "system"
//! content = "..."
//! ```
//!
//! Targeting is not supported: every context gets the same value.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use super::{Evaluation, SourceError};
use crate::aiconfig::Context;

#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the file once, surfacing syntax errors at startup.
    pub async fn check(&self) -> Result<(), SourceError> {
        self.read().await.map(|_| ())
    }

    pub async fn evaluate(&self, key: &str, ctx: &Context) -> Result<Evaluation, SourceError> {
        let doc = self.read().await?;
        debug!(flag_key = %key, context_key = %ctx.key(), path = %self.path.display(), "evaluating flag from file");

        if let Some(entry) = doc.get("configs").and_then(|c| c.get(key)) {
            return ai_config_evaluation(key, entry);
        }

        if let Some(flag) = doc.get("flags").and_then(|f| f.get(key)) {
            let value = serde_json::to_value(flag).map_err(|e| SourceError::Malformed(e.to_string()))?;
            return Ok(Evaluation { value, variation_key: None, version: None });
        }

        Err(SourceError::FlagNotFound(key.to_string()))
    }

    async fn read(&self) -> Result<toml::Value, SourceError> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            SourceError::NotConfigured(format!("cannot read {}: {e}", self.path.display()))
        })?;
        toml::from_str(&raw)
            .map_err(|e| SourceError::Malformed(format!("parse error in {}: {e}", self.path.display())))
    }
}

/// Convert a `[configs.<key>]` table into the remote value shape, moving
/// `enabled` / `variation` / `version` under `_ldMeta`.
fn ai_config_evaluation(key: &str, entry: &toml::Value) -> Result<Evaluation, SourceError> {
    let Value::Object(mut body) =
        serde_json::to_value(entry).map_err(|e| SourceError::Malformed(e.to_string()))?
    else {
        return Err(SourceError::Malformed(format!("configs.{key} must be a table")));
    };

    let enabled = body.remove("enabled").and_then(|v| v.as_bool()).unwrap_or(true);
    let variation_key = body
        .remove("variation")
        .and_then(|v| v.as_str().map(str::to_string));
    let version = body.remove("version").and_then(|v| v.as_u64());

    let mut meta = Map::new();
    meta.insert("enabled".into(), Value::Bool(enabled));
    if let Some(v) = &variation_key {
        meta.insert("variationKey".into(), Value::String(v.clone()));
    }
    if let Some(v) = version {
        meta.insert("version".into(), Value::from(v));
    }
    body.insert("_ldMeta".into(), Value::Object(meta));

    Ok(Evaluation { value: Value::Object(body), variation_key, version })
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tempfile::NamedTempFile;

    use super::*;

    const FLAGS: &str = r#"
[flags]
enable-advanced-options = true
banner-text = "hello"

[configs.thank-you-generator]
variation = "warm-anthropic"
version = 7
provider = { name = "anthropic" }
model = { name = "claude-3-haiku", parameters = { temperature = 0.5, max_tokens = 200 } }

[[configs.thank-you-generator.messages]]
role = "system"
content = "Write warmly."

[configs.paused]
enabled = false
"#;

    fn source(content: &str) -> (NamedTempFile, FileSource) {
        let f = NamedTempFile::new().unwrap();
        std::fs::write(f.path(), content).unwrap();
        let s = FileSource::new(f.path());
        (f, s)
    }

    fn ctx() -> Context {
        Context::builder("u").build().unwrap()
    }

    #[tokio::test]
    async fn boolean_flag() {
        let (_f, s) = source(FLAGS);
        let eval = s.evaluate("enable-advanced-options", &ctx()).await.unwrap();
        assert_eq!(eval.value, json!(true));
        assert!(eval.variation_key.is_none());
    }

    #[tokio::test]
    async fn ai_config_moves_meta() {
        let (_f, s) = source(FLAGS);
        let eval = s.evaluate("thank-you-generator", &ctx()).await.unwrap();
        assert_eq!(eval.variation_key.as_deref(), Some("warm-anthropic"));
        assert_eq!(eval.version, Some(7));
        assert_eq!(
            eval.value["_ldMeta"],
            json!({ "enabled": true, "variationKey": "warm-anthropic", "version": 7 })
        );
        assert_eq!(eval.value["provider"]["name"], "anthropic");
        assert_eq!(eval.value["model"]["parameters"]["max_tokens"], 200);
        assert_eq!(eval.value["messages"][0]["content"], "Write warmly.");
        assert!(eval.value.get("variation").is_none());
    }

    #[tokio::test]
    async fn disabled_config() {
        let (_f, s) = source(FLAGS);
        let eval = s.evaluate("paused", &ctx()).await.unwrap();
        assert_eq!(eval.value["_ldMeta"]["enabled"], false);
    }

    #[tokio::test]
    async fn unknown_key() {
        let (_f, s) = source(FLAGS);
        let err = s.evaluate("nope", &ctx()).await.unwrap_err();
        assert!(matches!(err, SourceError::FlagNotFound(_)));
    }

    #[tokio::test]
    async fn picks_up_edits() {
        let (f, s) = source("[flags]\nenable-advanced-options = false\n");
        assert_eq!(s.evaluate("enable-advanced-options", &ctx()).await.unwrap().value, json!(false));
        std::fs::write(f.path(), "[flags]\nenable-advanced-options = true\n").unwrap();
        assert_eq!(s.evaluate("enable-advanced-options", &ctx()).await.unwrap().value, json!(true));
    }

    #[tokio::test]
    async fn missing_file_not_configured() {
        let s = FileSource::new("/nonexistent/ai_configs.toml");
        assert!(matches!(s.check().await, Err(SourceError::NotConfigured(_))));
    }

    #[tokio::test]
    async fn syntax_error_malformed() {
        let (_f, s) = source("[flags\nbroken");
        assert!(matches!(s.check().await, Err(SourceError::Malformed(_))));
    }
}
