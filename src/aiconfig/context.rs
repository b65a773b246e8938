//! The identity and attribute bag a flag is evaluated for.

use std::collections::BTreeMap;

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::{Value, json};

use super::AiConfigError;

const CONTEXT_KIND: &str = "user";

/// A single-kind `user` context.
///
/// Serializes to the flat wire form `{"kind": "user", "key": "...", <attrs>}`.
#[derive(Debug, Clone, PartialEq)]
pub struct Context {
    kind: String,
    key: String,
    attributes: BTreeMap<String, Value>,
}

impl Context {
    pub fn builder(key: impl Into<String>) -> ContextBuilder {
        ContextBuilder::new(key)
    }

    /// Default user context for callers with no request data of their own.
    ///
    /// Carries the newlywed profile (`userType`, `groups`) that targeting
    /// rules in the configuration service key on, for evaluations made
    /// outside an HTTP request. The endpoint contexts in `generator::contexts`
    /// build their own attributes instead.
    pub fn with_defaults(key: impl Into<String>) -> Result<Self, AiConfigError> {
        Self::builder(key)
            .set("firstName", "Wedding")
            .set("lastName", "Couple")
            .set("email", "couple@example.com")
            .set("userType", "newlywed")
            .set("groups", json!(["premium", "wedding-users"]))
            .build()
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    /// Look up `kind`, `key`, or a custom attribute by name.
    pub fn get(&self, name: &str) -> Option<Value> {
        match name {
            "kind" => Some(Value::String(self.kind.clone())),
            "key" => Some(Value::String(self.key.clone())),
            other => self.attributes.get(other).cloned(),
        }
    }
}

impl Serialize for Context {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.attributes.len() + 2))?;
        map.serialize_entry("kind", &self.kind)?;
        map.serialize_entry("key", &self.key)?;
        for (k, v) in &self.attributes {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Fluent builder for [`Context`].
#[derive(Debug)]
pub struct ContextBuilder {
    key: String,
    attributes: BTreeMap<String, Value>,
}

impl ContextBuilder {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into(), attributes: BTreeMap::new() }
    }

    /// Set a custom attribute. `kind` and `key` are reserved and ignored here.
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        if name == "kind" || name == "key" {
            tracing::debug!(attribute = name, "context: reserved attribute name ignored");
            return self;
        }
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn build(self) -> Result<Context, AiConfigError> {
        if self.key.trim().is_empty() {
            return Err(AiConfigError::InvalidContext("context key must not be empty".into()));
        }
        Ok(Context {
            kind: CONTEXT_KIND.to_string(),
            key: self.key,
            attributes: self.attributes,
        })
    }
}
