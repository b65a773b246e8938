//! HTTP surface — axum router over the [`Generator`].
//!
//! `run()` drives the axum event loop; the [`CancellationToken`] is wired to
//! axum's graceful shutdown.
//!
//! ## URL layout
//!
//! ```text
//! GET  /                                → service banner
//! GET  /health
//! POST /generate
//! GET  /ai-config/status
//! GET  /feature-flags/advanced-options
//! POST /test-generate
//! ```

mod api;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::error::AppError;
use crate::generator::Generator;

// ── Shared request state ──────────────────────────────────────────────────────

/// Router state injected into every handler via [`axum::extract::State`].
///
/// Cheap to clone: the generator's clients are reference-counted.
#[derive(Clone)]
pub struct AppState {
    pub generator: Generator,
}

impl AppState {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }
}

// ── Server loop ───────────────────────────────────────────────────────────────

pub async fn run(bind_addr: &str, state: AppState, shutdown: CancellationToken) -> Result<(), AppError> {
    let router = build_router(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .map_err(|e| AppError::Server(format!("bind failed on {bind_addr}: {e}")))?;

    info!(%bind_addr, "HTTP server listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| AppError::Server(format!("server error: {e}")))?;

    info!("HTTP server shut down");
    Ok(())
}

// ── Router ────────────────────────────────────────────────────────────────────

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(api::root))
        .route("/health", get(api::health))
        .route("/generate", post(api::generate))
        .route("/ai-config/status", get(api::ai_config_status))
        .route("/feature-flags/advanced-options", get(api::advanced_options))
        .route("/test-generate", post(api::test_generate))
        .with_state(state)
}
