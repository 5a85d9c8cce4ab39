use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde_json::{Value, json};
use teger_shared::llm::{
    LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayRequest, LlmGatewayResponse,
};

/// Deterministic stand-in for the model: replies with the same output every
/// time and records what it was asked.
pub struct StubGateway {
    output: Result<Value, String>,
    calls: AtomicUsize,
    seen_requests: Mutex<Vec<LlmGatewayRequest>>,
}

impl StubGateway {
    pub fn replying(output: Value) -> Self {
        Self {
            output: Ok(output),
            calls: AtomicUsize::new(0),
            seen_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            output: Err(message.to_string()),
            calls: AtomicUsize::new(0),
            seen_requests: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_requests(&self) -> Vec<LlmGatewayRequest> {
        self.seen_requests
            .lock()
            .expect("stub request log should lock")
            .clone()
    }
}

impl LlmGateway for StubGateway {
    fn generate<'a>(&'a self, request: LlmGatewayRequest) -> LlmGatewayFuture<'a> {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen_requests
                .lock()
                .expect("stub request log should lock")
                .push(request);

            match &self.output {
                Ok(output) => Ok(LlmGatewayResponse {
                    model: "stub-model".to_string(),
                    provider_request_id: None,
                    output: output.clone(),
                    usage: None,
                }),
                Err(message) => Err(LlmGatewayError::ProviderFailure(message.clone())),
            }
        })
    }
}

pub fn fixed_assessment() -> Value {
    json!({
        "risk_score": 7,
        "threat_level": "HIGH",
        "tactics": ["urgency"],
        "triggers": ["deadline"],
        "dissonance_report": "...",
        "mitigation_steps": "..."
    })
}
