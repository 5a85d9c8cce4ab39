use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::prompts::PromptTemplate;

pub type LlmGatewayFuture<'a> =
    Pin<Box<dyn Future<Output = Result<LlmGatewayResponse, LlmGatewayError>> + Send + 'a>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningEffort {
    High,
}

impl ReasoningEffort {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmGatewayRequest {
    pub request_id: Option<String>,
    pub system_instruction: String,
    pub user_message: String,
    pub response_schema: Value,
    pub reasoning_effort: ReasoningEffort,
}

impl LlmGatewayRequest {
    pub fn from_template(template: PromptTemplate) -> Self {
        Self {
            request_id: None,
            system_instruction: template.system_instruction,
            user_message: template.user_message,
            response_schema: template.response_schema,
            reasoning_effort: template.reasoning_effort,
        }
    }

    pub fn with_request_id(mut self, request_id: impl AsRef<str>) -> Self {
        let trimmed = request_id.as_ref().trim();
        if !trimmed.is_empty() {
            self.request_id = Some(trimmed.to_string());
        }
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmTokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub thought_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmGatewayResponse {
    pub model: String,
    pub provider_request_id: Option<String>,
    pub output: Value,
    pub usage: Option<LlmTokenUsage>,
}

#[derive(Debug, Error)]
pub enum LlmGatewayError {
    #[error("llm provider request timed out")]
    Timeout,
    #[error("llm provider request failed: {0}")]
    ProviderFailure(String),
    #[error("llm provider returned an invalid payload: {0}")]
    InvalidProviderPayload(String),
}

/// A hosted model that accepts a system instruction plus one user turn and
/// replies with JSON shaped by `response_schema`.
pub trait LlmGateway: Send + Sync {
    fn generate<'a>(&'a self, request: LlmGatewayRequest) -> LlmGatewayFuture<'a>;
}
