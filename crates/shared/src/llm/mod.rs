pub mod contracts;
pub mod gateway;
pub mod gemini;
pub mod prompts;
pub mod validation;

pub use contracts::{SecurityAssessment, output_schema, provider_response_schema};
pub use gateway::{
    LlmGateway, LlmGatewayError, LlmGatewayFuture, LlmGatewayRequest, LlmGatewayResponse,
    LlmTokenUsage, ReasoningEffort,
};
pub use gemini::{GeminiConfigError, GeminiGateway, GeminiGatewayConfig};
pub use prompts::{PromptTemplate, security_assessment_template};
pub use validation::{OutputValidationError, validate_assessment_value};
