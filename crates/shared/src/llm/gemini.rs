use std::time::Duration;

use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use super::gateway::{
    LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayRequest, LlmGatewayResponse,
    LlmTokenUsage,
};
use crate::config::ConfigError;
use crate::config_env::{optional_trimmed_env, parse_bool_env, parse_u32_env, parse_u64_env};

const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-09-2025";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const DEFAULT_MAX_RETRIES: u32 = 0;
const DEFAULT_RETRY_BASE_BACKOFF_MS: u64 = 1_000;

const API_KEY_ENV: &str = "GEMINI_API_KEY";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, Clone)]
pub struct GeminiGatewayConfig {
    pub api_base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub retry_base_backoff_ms: u64,
    pub include_thoughts: bool,
}

impl GeminiGatewayConfig {
    /// Reads the gateway settings. Returns `Ok(None)` when no API key is set so
    /// the server can still start and report the misconfiguration per request.
    pub fn from_env() -> Result<Option<Self>, GeminiConfigError> {
        let Some(api_key) = optional_trimmed_env(API_KEY_ENV) else {
            return Ok(None);
        };

        let api_base_url = optional_trimmed_env("GEMINI_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        validate_base_url(&api_base_url)?;

        Ok(Some(Self {
            api_base_url,
            api_key,
            model: optional_trimmed_env("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            timeout_ms: parse_u64_env("GEMINI_TIMEOUT_MS", DEFAULT_TIMEOUT_MS)?,
            max_retries: parse_u32_env("GEMINI_MAX_RETRIES", DEFAULT_MAX_RETRIES)?,
            retry_base_backoff_ms: parse_u64_env(
                "GEMINI_RETRY_BASE_BACKOFF_MS",
                DEFAULT_RETRY_BASE_BACKOFF_MS,
            )?,
            include_thoughts: parse_bool_env("GEMINI_INCLUDE_THOUGHTS", true)?,
        }))
    }

    fn generate_content_url(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[derive(Debug, Error)]
pub enum GeminiConfigError {
    #[error(transparent)]
    Env(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to build Gemini http client: {0}")]
    HttpClient(String),
}

#[derive(Clone)]
pub struct GeminiGateway {
    client: reqwest::Client,
    config: GeminiGatewayConfig,
}

impl GeminiGateway {
    pub fn new(config: GeminiGatewayConfig) -> Result<Self, GeminiConfigError> {
        validate_base_url(&config.api_base_url)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| GeminiConfigError::HttpClient(err.to_string()))?;

        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    async fn generate_with_retries(
        &self,
        request: &LlmGatewayRequest,
    ) -> Result<LlmGatewayResponse, LlmGatewayError> {
        let mut attempt = 0_u32;

        loop {
            match self.send_once(request).await {
                Ok(response) => return Ok(response),
                Err(err) => {
                    if err.retryable && attempt < self.config.max_retries {
                        let backoff_multiplier = 2_u64.saturating_pow(attempt);
                        let backoff_ms = self
                            .config
                            .retry_base_backoff_ms
                            .saturating_mul(backoff_multiplier);
                        warn!(
                            request_id = request.request_id.as_deref().unwrap_or("-"),
                            attempt,
                            backoff_ms,
                            error = %err.error,
                            "retrying gemini request"
                        );
                        sleep(Duration::from_millis(backoff_ms)).await;
                        attempt = attempt.saturating_add(1);
                        continue;
                    }

                    return Err(err.error);
                }
            }
        }
    }

    async fn send_once(
        &self,
        request: &LlmGatewayRequest,
    ) -> Result<LlmGatewayResponse, SendAttemptError> {
        let request_body = json!({
            "systemInstruction": {
                "parts": [{ "text": request.system_instruction }]
            },
            "contents": [{
                "role": "user",
                "parts": [{ "text": request.user_message }]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": request.response_schema,
                "thinkingConfig": {
                    "thinkingLevel": request.reasoning_effort.as_str(),
                    "includeThoughts": self.config.include_thoughts
                }
            }
        });

        let response = self
            .client
            .post(self.config.generate_content_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    SendAttemptError::retryable(LlmGatewayError::Timeout)
                } else {
                    SendAttemptError::retryable(LlmGatewayError::ProviderFailure(
                        "request_unavailable".to_string(),
                    ))
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|err| {
            if err.is_timeout() {
                SendAttemptError::retryable(LlmGatewayError::Timeout)
            } else {
                SendAttemptError::non_retryable(LlmGatewayError::InvalidProviderPayload(
                    "response_body_read_failed".to_string(),
                ))
            }
        })?;

        if !status.is_success() {
            let provider_status = parse_provider_error_status(&body);
            return Err(SendAttemptError {
                error: LlmGatewayError::ProviderFailure(format!(
                    "status={} code={provider_status}",
                    status.as_u16()
                )),
                retryable: is_retryable_status(status),
            });
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&body).map_err(|_| {
            SendAttemptError::non_retryable(LlmGatewayError::InvalidProviderPayload(
                "response_json_parse_failed".to_string(),
            ))
        })?;

        if let Some(block_reason) = parsed
            .prompt_feedback
            .as_ref()
            .and_then(|feedback| feedback.block_reason.as_deref())
        {
            return Err(SendAttemptError::non_retryable(
                LlmGatewayError::InvalidProviderPayload(format!("prompt_blocked:{block_reason}")),
            ));
        }

        let candidate = parsed.candidates.first().ok_or_else(|| {
            SendAttemptError::non_retryable(LlmGatewayError::InvalidProviderPayload(
                "missing_candidate".to_string(),
            ))
        })?;

        let text = answer_text(candidate).ok_or_else(|| {
            let reason = candidate.finish_reason.as_deref().unwrap_or("unknown");
            SendAttemptError::non_retryable(LlmGatewayError::InvalidProviderPayload(format!(
                "missing_answer_text:finish_reason={reason}"
            )))
        })?;

        let output = serde_json::from_str::<Value>(&text).map_err(|_| {
            SendAttemptError::non_retryable(LlmGatewayError::InvalidProviderPayload(
                "content_not_json".to_string(),
            ))
        })?;
        if !output.is_object() {
            return Err(SendAttemptError::non_retryable(
                LlmGatewayError::InvalidProviderPayload("unsupported_content_shape".to_string()),
            ));
        }

        let usage = parsed.usage_metadata.map(|usage| LlmTokenUsage {
            prompt_tokens: clamp_u64_to_u32(usage.prompt_token_count.unwrap_or(0)),
            completion_tokens: clamp_u64_to_u32(usage.candidates_token_count.unwrap_or(0)),
            thought_tokens: clamp_u64_to_u32(usage.thoughts_token_count.unwrap_or(0)),
            total_tokens: clamp_u64_to_u32(usage.total_token_count.unwrap_or(0)),
        });
        debug!(
            request_id = request.request_id.as_deref().unwrap_or("-"),
            model = parsed.model_version.as_deref().unwrap_or(&self.config.model),
            thought_tokens = usage.as_ref().map(|usage| usage.thought_tokens),
            total_tokens = usage.as_ref().map(|usage| usage.total_tokens),
            "gemini response received"
        );

        Ok(LlmGatewayResponse {
            model: parsed
                .model_version
                .unwrap_or_else(|| self.config.model.clone()),
            provider_request_id: parsed.response_id,
            output,
            usage,
        })
    }
}

impl LlmGateway for GeminiGateway {
    fn generate<'a>(&'a self, request: LlmGatewayRequest) -> LlmGatewayFuture<'a> {
        Box::pin(async move { self.generate_with_retries(&request).await })
    }
}

#[derive(Debug)]
struct SendAttemptError {
    error: LlmGatewayError,
    retryable: bool,
}

impl SendAttemptError {
    fn retryable(error: LlmGatewayError) -> Self {
        Self {
            error,
            retryable: true,
        }
    }

    fn non_retryable(error: LlmGatewayError) -> Self {
        Self {
            error,
            retryable: false,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
    usage_metadata: Option<GeminiUsageMetadata>,
    model_version: Option<String>,
    response_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
struct GeminiPart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsageMetadata {
    prompt_token_count: Option<u64>,
    candidates_token_count: Option<u64>,
    thoughts_token_count: Option<u64>,
    total_token_count: Option<u64>,
}

/// Joins the non-thought text parts of a candidate. Thought summaries are
/// returned alongside the answer when `includeThoughts` is on.
fn answer_text(candidate: &GeminiCandidate) -> Option<String> {
    let parts = &candidate.content.as_ref()?.parts;
    let text = parts
        .iter()
        .filter(|part| !part.thought)
        .filter_map(|part| part.text.as_deref())
        .collect::<String>();

    if text.trim().is_empty() { None } else { Some(text) }
}

fn validate_base_url(url: &str) -> Result<(), GeminiConfigError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        return Ok(());
    }

    Err(GeminiConfigError::InvalidConfiguration(
        "GEMINI_API_BASE_URL must start with http:// or https://".to_string(),
    ))
}

fn is_retryable_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::REQUEST_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

fn parse_provider_error_status(body: &str) -> String {
    #[derive(Deserialize)]
    struct ProviderErrorEnvelope {
        error: Option<ProviderErrorDetails>,
    }

    #[derive(Deserialize)]
    struct ProviderErrorDetails {
        status: Option<String>,
        code: Option<Value>,
    }

    let details = serde_json::from_str::<ProviderErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error);
    let Some(details) = details else {
        return "unknown".to_string();
    };

    if let Some(status) = details.status {
        return status;
    }

    match details.code {
        Some(Value::String(code)) => code,
        Some(Value::Number(code)) => code.to_string(),
        _ => "unknown".to_string(),
    }
}

fn clamp_u64_to_u32(value: u64) -> u32 {
    value.min(u32::MAX as u64) as u32
}
