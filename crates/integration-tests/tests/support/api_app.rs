use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::{Value, json};
use teger_api::http::{AppState, build_router};
use teger_shared::analysis::MessageAnalyzer;
use teger_shared::llm::LlmGateway;
use tower::ServiceExt;

pub const TEST_ENGINE_LABEL: &str = "Gemini 3 High-Reasoning";

pub fn build_test_router(gateway: Option<Arc<dyn LlmGateway>>) -> axum::Router {
    build_test_router_with_origins(gateway, Vec::new())
}

pub fn build_test_router_with_origins(
    gateway: Option<Arc<dyn LlmGateway>>,
    cors_allowed_origins: Vec<String>,
) -> axum::Router {
    build_router(AppState {
        analyzer: MessageAnalyzer::new(gateway),
        health_engine_label: TEST_ENGINE_LABEL.to_string(),
        cors_allowed_origins,
    })
}

pub struct JsonResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub raw_body: String,
    pub body: Value,
}

pub async fn send_json(app: &axum::Router, request: Request<Body>) -> JsonResponse {
    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("request should succeed");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should read");
    let raw_body = String::from_utf8_lossy(&bytes).into_owned();
    let body = serde_json::from_slice::<Value>(&bytes).unwrap_or_else(|_| json!({}));

    JsonResponse {
        status,
        headers,
        raw_body,
        body,
    }
}

pub fn request(method: Method, uri: &str, json_body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    match json_body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build"),
        None => builder.body(Body::empty()).expect("request should build"),
    }
}

pub fn analyze_request(body: Value) -> Request<Body> {
    request(Method::POST, "/analyze", Some(body))
}

pub fn sample_message() -> Value {
    json!({
        "sender": "ceo@acme.example",
        "content": "I need you to buy five gift cards in the next 30 minutes. Don't call me, I'm in a board meeting.",
        "platform": "Email",
        "metadata": { "thread_id": "t-42" }
    })
}

pub fn detail(body: &Value) -> Option<&str> {
    body.get("detail").and_then(Value::as_str)
}
