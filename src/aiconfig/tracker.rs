//! Per-evaluation analytics handle.

use std::time::Duration;

use crate::events::{self, AnalyticsEvent, EventData, EventSink};
use crate::llm::TokenUsage;

/// Reports the outcome of one generation back to the configuration service.
///
/// Returned alongside every resolved config, including fallbacks; a fallback
/// tracker simply carries no variation key.
#[derive(Debug, Clone)]
pub struct AiConfigTracker {
    sink: EventSink,
    context_kind: String,
    context_key: String,
    data: EventData,
}

impl AiConfigTracker {
    pub(crate) fn new(
        sink: EventSink,
        config_key: &str,
        variation_key: Option<String>,
        version: Option<u64>,
        context_kind: &str,
        context_key: &str,
    ) -> Self {
        Self {
            sink,
            context_kind: context_kind.to_string(),
            context_key: context_key.to_string(),
            data: EventData {
                config_key: config_key.to_string(),
                variation_key,
                version,
            },
        }
    }

    pub fn config_key(&self) -> &str {
        &self.data.config_key
    }

    /// Variation served for this evaluation; `None` when the fallback was used.
    pub fn variation_key(&self) -> Option<&str> {
        self.data.variation_key.as_deref()
    }

    pub fn track_success(&self) {
        self.emit(events::GENERATION_SUCCESS, Some(1.0));
    }

    pub fn track_error(&self) {
        self.emit(events::GENERATION_ERROR, Some(1.0));
    }

    pub fn track_duration(&self, elapsed: Duration) {
        self.emit(events::DURATION_TOTAL, Some(elapsed.as_millis() as f64));
    }

    /// Emits total, input and output counts; zero counts are skipped.
    pub fn track_tokens(&self, usage: TokenUsage) {
        for (key, count) in [
            (events::TOKENS_TOTAL, usage.total()),
            (events::TOKENS_INPUT, usage.input_tokens),
            (events::TOKENS_OUTPUT, usage.output_tokens),
        ] {
            if count > 0 {
                self.emit(key, Some(count as f64));
            }
        }
    }

    fn emit(&self, key: &str, metric_value: Option<f64>) {
        self.sink.send(AnalyticsEvent::custom(
            key,
            &self.context_kind,
            &self.context_key,
            self.data.clone(),
            metric_value,
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(sink: &EventSink) -> AiConfigTracker {
        AiConfigTracker::new(sink.clone(), "thank-you-generator", Some("v-a".into()), Some(3), "user", "u-1")
    }

    #[test]
    fn success_and_error_events() {
        let sink = EventSink::memory();
        let t = tracker(&sink);
        t.track_success();
        t.track_error();
        let events = sink.recorded();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].key, events::GENERATION_SUCCESS);
        assert_eq!(events[1].key, events::GENERATION_ERROR);
        assert_eq!(events[0].data.variation_key.as_deref(), Some("v-a"));
        assert_eq!(events[0].data.version, Some(3));
        assert_eq!(events[0].context_keys["user"], "u-1");
    }

    #[test]
    fn duration_in_millis() {
        let sink = EventSink::memory();
        tracker(&sink).track_duration(Duration::from_millis(1500));
        assert_eq!(sink.recorded()[0].metric_value, Some(1500.0));
    }

    #[test]
    fn token_events_skip_zero() {
        let sink = EventSink::memory();
        tracker(&sink).track_tokens(TokenUsage { input_tokens: 10, output_tokens: 0 });
        let keys: Vec<_> = sink.recorded().into_iter().map(|e| (e.key, e.metric_value)).collect();
        assert_eq!(
            keys,
            vec![
                (events::TOKENS_TOTAL.to_string(), Some(10.0)),
                (events::TOKENS_INPUT.to_string(), Some(10.0)),
            ]
        );
    }

    #[test]
    fn accessors() {
        let t = tracker(&EventSink::Disabled);
        assert_eq!(t.config_key(), "thank-you-generator");
        assert_eq!(t.variation_key(), Some("v-a"));
        assert_eq!(t.data.version, Some(3));
    }
}
