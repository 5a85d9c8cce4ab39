use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use crate::llm::contracts::SecurityAssessment;
use crate::llm::gateway::{LlmGateway, LlmGatewayError, LlmGatewayRequest};
use crate::llm::prompts::security_assessment_template;
use crate::llm::validation::{OutputValidationError, validate_assessment_value};
use crate::models::AnalysisRequest;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("model api credential is not configured")]
    Configuration,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error(transparent)]
    Gateway(#[from] LlmGatewayError),
    #[error(transparent)]
    InvalidOutput(#[from] OutputValidationError),
}

/// Runs one message through the model. Holds no per-request state, so a
/// single instance is shared by every handler.
#[derive(Clone)]
pub struct MessageAnalyzer {
    gateway: Option<Arc<dyn LlmGateway>>,
}

impl MessageAnalyzer {
    pub fn new(gateway: Option<Arc<dyn LlmGateway>>) -> Self {
        Self { gateway }
    }

    pub fn unconfigured() -> Self {
        Self { gateway: None }
    }

    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        request_id: Option<&str>,
    ) -> Result<SecurityAssessment, AnalysisError> {
        let Some(gateway) = self.gateway.as_deref() else {
            return Err(AnalysisError::Configuration);
        };

        let mut gateway_request =
            LlmGatewayRequest::from_template(security_assessment_template(request));
        if let Some(request_id) = request_id {
            gateway_request = gateway_request.with_request_id(request_id);
        }

        let response = gateway
            .generate(gateway_request)
            .await
            .map_err(UpstreamError::from)?;
        let assessment =
            validate_assessment_value(&response.output).map_err(UpstreamError::from)?;

        info!(
            request_id = request_id.unwrap_or("-"),
            model = %response.model,
            provider_request_id = response.provider_request_id.as_deref().unwrap_or("-"),
            platform = %request.platform,
            "message analysis completed"
        );

        Ok(assessment)
    }
}
