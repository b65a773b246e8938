//! Axum handlers.
//!
//! Each handler receives [`AppState`] via [`axum::extract::State`] and
//! returns an axum [`Response`]. Status and flag endpoints report failures
//! in a 200 body; generation failures map to HTTP status codes.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::warn;

use super::AppState;
use crate::generator::{GenerateError, ThankYouRequest};

const ADVANCED_OPTIONS_DESCRIPTION: &str =
    "Controls whether advanced form options (tone, additional notes) are shown";

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Build a `{"detail": ...}` error response.
fn json_detail(status: StatusCode, msg: impl std::fmt::Display) -> Response {
    (status, Json(json!({ "detail": format!("{msg}") }))).into_response()
}

impl IntoResponse for GenerateError {
    fn into_response(self) -> Response {
        match self {
            GenerateError::Invalid(msg) => json_detail(StatusCode::UNPROCESSABLE_ENTITY, msg),
            GenerateError::Disabled => json_detail(StatusCode::SERVICE_UNAVAILABLE, GenerateError::Disabled),
            other => json_detail(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Generation failed: {other}"),
            ),
        }
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /
pub(super) async fn root() -> Response {
    Json(json!({ "message": "Wedding Thank You Generator API", "status": "running" })).into_response()
}

/// GET /health
pub(super) async fn health() -> Response {
    Json(json!({ "status": "healthy", "ai_config_enabled": true })).into_response()
}

/// POST /generate
pub(super) async fn generate(
    State(state): State<AppState>,
    body: Result<Json<ThankYouRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => {
            warn!(error = %rejection.body_text(), "rejected /generate body");
            return json_detail(rejection.status(), rejection.body_text());
        }
    };

    match state.generator.generate(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(e) => e.into_response(),
    }
}

/// GET /ai-config/status
pub(super) async fn ai_config_status(State(state): State<AppState>) -> Response {
    match state.generator.status().await {
        Ok(status) => Json(status).into_response(),
        Err(e) => {
            warn!(error = %e, "AI config status failed");
            Json(json!({ "status": "error", "error": e.to_string() })).into_response()
        }
    }
}

/// GET /feature-flags/advanced-options
pub(super) async fn advanced_options(State(state): State<AppState>) -> Response {
    match state.generator.advanced_options().await {
        Ok(enabled) => Json(json!({
            "flag_key": state.generator.advanced_options_flag(),
            "enabled": enabled,
            "description": ADVANCED_OPTIONS_DESCRIPTION,
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "advanced options flag check failed");
            Json(json!({ "error": format!("Failed to check advanced options flag: {e}"), "enabled": false }))
                .into_response()
        }
    }
}

/// POST /test-generate
pub(super) async fn test_generate(State(state): State<AppState>) -> Response {
    match state.generator.test_generate().await {
        Ok(report) => Json(json!({
            "status": "success",
            "ai_config_test": report,
            "message": "AI Config loaded successfully!",
        }))
        .into_response(),
        Err(e) => {
            warn!(error = %e, "test generation failed");
            Json(json!({ "status": "error", "error": e.to_string(), "message": "AI Config test failed" }))
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aiconfig::AiConfigError;
    use crate::llm::ProviderError;

    #[test]
    fn error_status_codes() {
        assert_eq!(
            GenerateError::Invalid("x".into()).into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(GenerateError::Disabled.into_response().status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            GenerateError::Provider(ProviderError::Request("boom".into())).into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            GenerateError::AiConfig(AiConfigError::NotConfigured("no key".into()))
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
