//! Service assembly — turns a loaded [`Config`] into a ready [`Generator`].
//!
//! Source selection:
//!   - `static`  → [`FileSource`] over `[aiconfig.static] path`, events dropped
//!   - `remote` with `AICONFIG_SDK_KEY` → [`RemoteSource`] + [`EventProcessor`]
//!   - `remote` without a key → `ConfigSource::Unavailable`; endpoints that
//!     need a config fail instead of silently serving the fallback
//!
//! The event processor has its own token. [`Service::run`] cancels it only
//! after the HTTP server has drained, so requests finishing during graceful
//! shutdown still get their events into the final flush.

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::aiconfig::AiConfigClient;
use crate::aiconfig::source::{ConfigSource, file::FileSource, remote::RemoteSource};
use crate::config::{Config, SourceKind};
use crate::error::AppError;
use crate::events::{EventProcessor, EventSink};
use crate::generator::Generator;
use crate::llm::Providers;
use crate::server::{self, AppState};

pub struct Service {
    pub generator: Generator,
    /// Background event delivery, if the source reports events.
    events: Option<JoinHandle<()>>,
    events_shutdown: CancellationToken,
}

impl Service {
    /// Serve HTTP until `shutdown` fires and in-flight requests finish, then
    /// stop the event processor and wait for its last flush.
    pub async fn run(self, bind_addr: &str, shutdown: CancellationToken) -> Result<(), AppError> {
        let result = server::run(bind_addr, AppState::new(self.generator), shutdown).await;

        self.events_shutdown.cancel();
        if let Some(events) = self.events {
            events.await.ok();
        }
        info!("event delivery stopped");

        result
    }
}

pub async fn build(config: &Config) -> Result<Service, AppError> {
    let events_shutdown = CancellationToken::new();

    let (source, sink, events) = match config.aiconfig.source {
        SourceKind::Static => {
            let file = FileSource::new(&config.aiconfig.static_source.path);
            if let Err(e) = file.check().await {
                warn!(path = %file.path().display(), error = %e, "static AI config file unusable");
            }
            (ConfigSource::File(file), EventSink::Disabled, None)
        }
        SourceKind::Remote => match &config.secrets.sdk_key {
            Some(sdk_key) => {
                let remote = &config.aiconfig.remote;
                let source = RemoteSource::new(&remote.base_url, sdk_key.clone(), remote.timeout_seconds)
                    .map_err(|e| AppError::Startup(format!("AI config client: {e}")))?;
                let (sink, handle) = EventProcessor::spawn(remote, sdk_key.clone(), events_shutdown.clone())?;
                (ConfigSource::Remote(source), sink, Some(handle))
            }
            None => {
                warn!("AICONFIG_SDK_KEY not set; AI config endpoints will fail");
                (
                    ConfigSource::Unavailable("AICONFIG_SDK_KEY environment variable not set".into()),
                    EventSink::Disabled,
                    None,
                )
            }
        },
    };

    let providers = Providers::from_config(&config.llm, &config.secrets)
        .map_err(|e| AppError::Startup(format!("LLM providers: {e}")))?;

    let client = AiConfigClient::new(source, sink);
    info!(
        source = client.source_name(),
        config_key = %config.aiconfig.key,
        flag_key = %config.aiconfig.advanced_options_flag,
        "AI config client ready"
    );

    Ok(Service {
        generator: Generator::new(
            client,
            providers,
            config.aiconfig.key.clone(),
            config.aiconfig.advanced_options_flag.clone(),
        ),
        events,
        events_shutdown,
    })
}
