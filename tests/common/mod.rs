//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::path::Path;

use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tower::ServiceExt;

use thankyou_bot::aiconfig::AiConfigClient;
use thankyou_bot::aiconfig::source::{ConfigSource, file::FileSource};
use thankyou_bot::config::{Config, Secrets};
use thankyou_bot::events::EventSink;
use thankyou_bot::generator::Generator;
use thankyou_bot::llm::Providers;
use thankyou_bot::server::{AppState, build_router};

/// Serve `router` on an ephemeral local port and return its base URL.
pub async fn serve(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

pub fn write_configs(content: &str) -> NamedTempFile {
    let f = NamedTempFile::new().unwrap();
    std::fs::write(f.path(), content).unwrap();
    f
}

/// Router over a static config file. `openai_url` points the OpenAI provider
/// at a mock server and gives it a key.
pub fn app(static_path: &Path, openai_url: Option<&str>, source: Option<ConfigSource>) -> (Router, EventSink) {
    let mut cfg = Config::test_default(static_path);
    let mut secrets = Secrets::default();
    if let Some(url) = openai_url {
        cfg.llm.openai.api_base_url = url.to_string();
        secrets.openai_api_key = Some("sk-test".into());
    }

    let sink = EventSink::memory();
    let source = source.unwrap_or_else(|| ConfigSource::File(FileSource::new(static_path)));
    let client = AiConfigClient::new(source, sink.clone());
    let providers = Providers::from_config(&cfg.llm, &secrets).unwrap();
    let generator = Generator::new(
        client,
        providers,
        cfg.aiconfig.key.clone(),
        cfg.aiconfig.advanced_options_flag.clone(),
    );
    (build_router(AppState::new(generator)), sink)
}

pub async fn send(router: &Router, request: Request<Body>) -> (u16, Value) {
    let resp: Response<Body> = router.clone().oneshot(request).await.unwrap();
    let status = resp.status().as_u16();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder().method("POST").uri(uri).body(Body::empty()).unwrap()
}
