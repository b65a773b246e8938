//! Background delivery of analytics events.
//!
//! Events arrive over an mpsc channel and are buffered. The buffer is POSTed
//! as one JSON array to `{events_url}/bulk` when it reaches capacity, on
//! every flush tick, and once more when the shutdown token fires. A failed
//! delivery is logged and the batch is dropped.

use std::time::Duration;

use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::{AnalyticsEvent, EventSink};
use crate::config::RemoteSourceConfig;
use crate::error::AppError;

pub struct EventProcessor {
    client: Client,
    bulk_url: String,
    sdk_key: String,
    capacity: usize,
    flush_interval: Duration,
    rx: mpsc::Receiver<AnalyticsEvent>,
}

impl EventProcessor {
    /// Start the processor task and return the sink that feeds it.
    ///
    /// The queue holds four batches; beyond that, events are dropped at the
    /// sink rather than stalling request handlers.
    pub fn spawn(
        config: &RemoteSourceConfig,
        sdk_key: String,
        shutdown: CancellationToken,
    ) -> Result<(EventSink, JoinHandle<()>), AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| AppError::Startup(format!("failed to build events HTTP client: {e}")))?;

        let (tx, rx) = mpsc::channel(config.event_capacity.saturating_mul(4).max(1));
        let processor = EventProcessor {
            client,
            bulk_url: format!("{}/bulk", config.events_url.trim_end_matches('/')),
            sdk_key,
            capacity: config.event_capacity.max(1),
            flush_interval: Duration::from_secs(config.flush_interval_seconds.max(1)),
            rx,
        };

        let handle = tokio::spawn(processor.run(shutdown));
        Ok((EventSink::Channel(tx), handle))
    }

    async fn run(mut self, shutdown: CancellationToken) {
        info!(url = %self.bulk_url, capacity = self.capacity, "event processor started");

        let mut buffer: Vec<AnalyticsEvent> = Vec::with_capacity(self.capacity);
        let mut ticker = tokio::time::interval(self.flush_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        // The first tick completes immediately.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    while let Ok(ev) = self.rx.try_recv() {
                        buffer.push(ev);
                    }
                    self.flush(&mut buffer).await;
                    break;
                }
                maybe = self.rx.recv() => match maybe {
                    Some(ev) => {
                        buffer.push(ev);
                        if buffer.len() >= self.capacity {
                            self.flush(&mut buffer).await;
                        }
                    }
                    None => {
                        self.flush(&mut buffer).await;
                        break;
                    }
                },
                _ = ticker.tick() => self.flush(&mut buffer).await,
            }
        }

        info!("event processor stopped");
    }

    async fn flush(&self, buffer: &mut Vec<AnalyticsEvent>) {
        if buffer.is_empty() {
            return;
        }
        let batch = std::mem::take(buffer);
        let count = batch.len();

        let result = self
            .client
            .post(&self.bulk_url)
            .header(reqwest::header::AUTHORIZATION, &self.sdk_key)
            .json(&batch)
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => debug!(count, "analytics events delivered"),
            Ok(resp) => warn!(count, status = %resp.status(), "analytics delivery rejected — batch dropped"),
            Err(e) => warn!(count, error = %e, "analytics delivery failed — batch dropped"),
        }
    }
}
