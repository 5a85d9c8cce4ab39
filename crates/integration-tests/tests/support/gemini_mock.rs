use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{Value, json};
use teger_shared::llm::{GeminiGateway, GeminiGatewayConfig, LlmGateway};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, oneshot};

/// In-process stand-in for the Gemini `generateContent` endpoint that answers
/// every call with the same status and body.
pub struct MockGemini {
    pub base_url: String,
    pub calls: Arc<Mutex<usize>>,
    shutdown_tx: oneshot::Sender<()>,
    server_task: tokio::task::JoinHandle<()>,
}

#[derive(Clone)]
struct MockState {
    status: StatusCode,
    body: Value,
    calls: Arc<Mutex<usize>>,
}

impl MockGemini {
    pub async fn answering(output: &Value) -> Self {
        Self::spawn(StatusCode::OK, success_body(&output.to_string())).await
    }

    pub async fn failing(status: StatusCode, message: &str) -> Self {
        Self::spawn(
            status,
            json!({
                "error": {
                    "code": status.as_u16(),
                    "message": message,
                    "status": "INTERNAL"
                }
            }),
        )
        .await
    }

    pub async fn spawn(status: StatusCode, body: Value) -> Self {
        let calls = Arc::new(Mutex::new(0));
        let app = Router::new()
            .route("/v1beta/models/{call}", post(generate_content))
            .with_state(MockState {
                status,
                body,
                calls: calls.clone(),
            });

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let local_addr = listener
            .local_addr()
            .expect("listener address should resolve");
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let server_task = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("mock gemini server should run");
        });

        Self {
            base_url: format!("http://{local_addr}/v1beta"),
            calls,
            shutdown_tx,
            server_task,
        }
    }

    pub fn gateway(&self) -> Arc<dyn LlmGateway> {
        let gateway = GeminiGateway::new(GeminiGatewayConfig {
            api_base_url: self.base_url.clone(),
            api_key: "integration-test-key".to_string(),
            model: "gemini-test".to_string(),
            timeout_ms: 5_000,
            max_retries: 0,
            retry_base_backoff_ms: 0,
            include_thoughts: true,
        })
        .expect("gateway should build");
        Arc::new(gateway)
    }

    pub async fn call_count(&self) -> usize {
        *self.calls.lock().await
    }

    pub async fn shutdown(self) {
        self.shutdown_tx.send(()).expect("shutdown signal should send");
        self.server_task.await.expect("server task should join");
    }
}

pub fn success_body(answer_text: &str) -> Value {
    json!({
        "candidates": [
            {
                "content": {
                    "role": "model",
                    "parts": [
                        { "text": "Checking tone against the claimed role.", "thought": true },
                        { "text": answer_text }
                    ]
                },
                "finishReason": "STOP"
            }
        ],
        "usageMetadata": {
            "promptTokenCount": 40,
            "candidatesTokenCount": 25,
            "thoughtsTokenCount": 120,
            "totalTokenCount": 185
        },
        "modelVersion": "gemini-test",
        "responseId": "mock-response"
    })
}

async fn generate_content(
    State(state): State<MockState>,
    Json(_payload): Json<Value>,
) -> (StatusCode, Json<Value>) {
    *state.calls.lock().await += 1;
    (state.status, Json(state.body))
}
