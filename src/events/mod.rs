//! Analytics events reported back to the configuration service.
//!
//! Trackers push [`AnalyticsEvent`]s into an [`EventSink`]. In production the
//! sink feeds the background [`EventProcessor`], which batches and delivers
//! them; tests and the static source use the in-memory sink.

mod processor;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::warn;

pub use processor::EventProcessor;

pub const GENERATION_SUCCESS: &str = "$ld:ai:generation:success";
pub const GENERATION_ERROR: &str = "$ld:ai:generation:error";
pub const DURATION_TOTAL: &str = "$ld:ai:duration:total";
pub const TOKENS_TOTAL: &str = "$ld:ai:tokens:total";
pub const TOKENS_INPUT: &str = "$ld:ai:tokens:input";
pub const TOKENS_OUTPUT: &str = "$ld:ai:tokens:output";

/// Which config evaluation an event belongs to.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventData {
    pub config_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variation_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<u64>,
}

/// One custom event in the service's bulk-ingest shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsEvent {
    pub kind: &'static str,
    pub key: String,
    pub context_keys: BTreeMap<String, String>,
    pub data: EventData,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metric_value: Option<f64>,
    /// Unix epoch milliseconds.
    pub creation_date: i64,
}

impl AnalyticsEvent {
    pub fn custom(
        key: &str,
        context_kind: &str,
        context_key: &str,
        data: EventData,
        metric_value: Option<f64>,
    ) -> Self {
        Self {
            kind: "custom",
            key: key.to_string(),
            context_keys: BTreeMap::from([(context_kind.to_string(), context_key.to_string())]),
            data,
            metric_value,
            creation_date: chrono::Utc::now().timestamp_millis(),
        }
    }
}

/// Where trackers send their events. Cheap to clone.
#[derive(Debug, Clone)]
pub enum EventSink {
    /// Events are dropped.
    Disabled,
    /// Events are kept in memory; read them back with [`EventSink::recorded`].
    Memory(Arc<Mutex<Vec<AnalyticsEvent>>>),
    /// Events are forwarded to a running [`EventProcessor`].
    Channel(mpsc::Sender<AnalyticsEvent>),
}

impl EventSink {
    pub fn memory() -> Self {
        EventSink::Memory(Arc::default())
    }

    /// Never blocks the request path: a full or closed channel drops the event.
    pub fn send(&self, event: AnalyticsEvent) {
        match self {
            EventSink::Disabled => {}
            EventSink::Memory(buf) => match buf.lock() {
                Ok(mut events) => events.push(event),
                Err(_) => warn!(key = %event.key, "event buffer poisoned, event dropped"),
            },
            EventSink::Channel(tx) => {
                if let Err(e) = tx.try_send(event) {
                    warn!(error = %e, "analytics queue unavailable — event dropped");
                }
            }
        }
    }

    /// Snapshot of recorded events. Empty for non-memory sinks.
    pub fn recorded(&self) -> Vec<AnalyticsEvent> {
        match self {
            EventSink::Memory(buf) => buf.lock().map(|e| e.clone()).unwrap_or_default(),
            _ => Vec::new(),
        }
    }
}
