//! Configuration loading with env-var overrides.
//!
//! Reads TOML files, supports `[meta] base = "..."` inheritance chains,
//! and applies `THANKYOU_LOG_LEVEL` and `THANKYOU_BIND` env overrides.

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::AppError;

use super::raw::RawConfig;
use super::types::*;

/// Deep-merge two TOML values.
/// Tables are merged recursively — the overlay only needs to specify keys that
/// differ from the base. For every other type (string, integer, array, …)
/// the overlay value replaces the base value wholesale.
fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_tbl), toml::Value::Table(overlay_tbl)) => {
            for (key, ov_val) in overlay_tbl {
                let merged = match base_tbl.remove(&key) {
                    Some(base_val) => merge_toml(base_val, ov_val),
                    None => ov_val,
                };
                base_tbl.insert(key, merged);
            }
            toml::Value::Table(base_tbl)
        }
        (_, overlay) => overlay,
    }
}

/// Read a config file, follow any `[meta] base = "..."` chain, and return the
/// fully merged `toml::Value`. `visited` carries canonicalized paths already
/// seen in this chain so circular references are caught early.
fn load_raw_merged(path: &Path, visited: &mut HashSet<PathBuf>) -> Result<toml::Value, AppError> {
    let canonical = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    if !visited.insert(canonical) {
        return Err(AppError::Config(format!(
            "circular base reference detected at: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let overlay_val: toml::Value = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    if let Some(base_str) = overlay_val
        .get("meta")
        .and_then(|m| m.get("base"))
        .and_then(|b| b.as_str())
    {
        let base_path = if Path::new(base_str).is_absolute() {
            PathBuf::from(base_str)
        } else {
            path.parent().unwrap_or(Path::new(".")).join(base_str)
        };
        let base_val = load_raw_merged(&base_path, visited)?;
        Ok(merge_toml(base_val, overlay_val))
    } else {
        Ok(overlay_val)
    }
}

/// Load config from the given path, or `config/default.toml`, then apply env-var overrides.
/// If no path is given and `config/default.toml` does not exist, every section
/// takes its built-in default.
pub fn load(config_path: Option<&str>) -> Result<Config, AppError> {
    let log_level_override = env::var("THANKYOU_LOG_LEVEL").ok();
    let bind_override = env::var("THANKYOU_BIND").ok();

    if let Some(path) = config_path {
        return load_from(
            Path::new(path),
            log_level_override.as_deref(),
            bind_override.as_deref(),
        );
    }

    let default_path = Path::new("config/default.toml");
    if default_path.exists() {
        load_from(
            default_path,
            log_level_override.as_deref(),
            bind_override.as_deref(),
        )
    } else {
        let empty = toml::Value::Table(toml::map::Map::new());
        let parsed: RawConfig = Deserialize::deserialize(empty)
            .map_err(|e: toml::de::Error| AppError::Config(format!("built-in defaults: {e}")))?;
        resolve(
            parsed,
            Path::new("config"),
            log_level_override.as_deref(),
            bind_override.as_deref(),
            Secrets::from_env(),
        )
    }
}

/// Load from an explicit path with optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
/// Follows `[meta] base = "..."` inheritance chains before resolving.
pub fn load_from(
    path: &Path,
    log_level_override: Option<&str>,
    bind_override: Option<&str>,
) -> Result<Config, AppError> {
    let merged_val = load_raw_merged(path, &mut HashSet::new())?;

    let parsed: RawConfig = Deserialize::deserialize(merged_val).map_err(|e: toml::de::Error| {
        AppError::Config(format!("config error in {}: {e}", path.display()))
    })?;

    let config_dir = path.parent().unwrap_or(Path::new("."));
    resolve(
        parsed,
        config_dir,
        log_level_override,
        bind_override,
        Secrets::from_env(),
    )
}

fn resolve(
    parsed: RawConfig,
    config_dir: &Path,
    log_level_override: Option<&str>,
    bind_override: Option<&str>,
    secrets: Secrets,
) -> Result<Config, AppError> {
    let s = parsed.service;
    let a = parsed.aiconfig;

    let source = SourceKind::parse(&a.source).ok_or_else(|| {
        AppError::Config(format!(
            "aiconfig.source must be \"remote\" or \"static\", got \"{}\"",
            a.source
        ))
    })?;

    if a.key.trim().is_empty() {
        return Err(AppError::Config("aiconfig.key must not be empty".into()));
    }

    let log_level = log_level_override.unwrap_or(&s.log_level).to_string();
    // Bare levels are checked here; full filter directives are left to the subscriber.
    if !log_level.contains(['=', ',']) {
        crate::logger::parse_level(&log_level)?;
    }

    let static_path = expand_home(&a.static_source.path);
    let static_path = if static_path.is_absolute() {
        static_path
    } else {
        config_dir.join(static_path)
    };

    let base_url = a.remote.base_url.trim_end_matches('/').to_string();
    let events_url = a
        .remote
        .events_url
        .map(|u| u.trim_end_matches('/').to_string())
        .unwrap_or_else(|| base_url.clone());

    Ok(Config {
        service_name: s.name,
        log_level,
        bind: bind_override.unwrap_or(&s.bind).to_string(),
        aiconfig: AiConfigSettings {
            key: a.key,
            advanced_options_flag: a.advanced_options_flag,
            source,
            remote: RemoteSourceConfig {
                base_url,
                events_url,
                timeout_seconds: a.remote.timeout_seconds.max(1),
                flush_interval_seconds: a.remote.flush_interval_seconds.max(1),
                event_capacity: a.remote.event_capacity.max(1),
            },
            static_source: StaticSourceConfig { path: static_path },
        },
        llm: LlmConfig {
            openai: OpenAiConfig {
                api_base_url: parsed.llm.openai.api_base_url,
                timeout_seconds: parsed.llm.openai.timeout_seconds,
            },
            anthropic: AnthropicConfig {
                api_base_url: parsed.llm.anthropic.api_base_url,
                api_version: parsed.llm.anthropic.api_version,
                timeout_seconds: parsed.llm.anthropic.timeout_seconds,
            },
        },
        secrets,
    })
}

impl Secrets {
    /// Read `AICONFIG_SDK_KEY`, `OPENAI_API_KEY` and `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Self {
        Self {
            sdk_key: secret(env::var("AICONFIG_SDK_KEY").ok()),
            openai_api_key: secret(env::var("OPENAI_API_KEY").ok()),
            anthropic_api_key: secret(env::var("ANTHROPIC_API_KEY").ok()),
        }
    }
}

/// Drop empty values and the `your_..._here` placeholders shipped in `.env.example`.
pub fn secret(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .filter(|v| !(v.starts_with("your_") && v.ends_with("_here")))
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
