use std::sync::LazyLock;

use jsonschema::JSONSchema;
use serde_json::Value;
use thiserror::Error;

use super::contracts::{SecurityAssessment, output_schema};

#[derive(Debug, Error)]
pub enum OutputValidationError {
    #[error("assessment schema failed to compile: {0}")]
    SchemaCompile(String),
    #[error("assessment output failed schema validation: {errors:?}")]
    SchemaViolation { errors: Vec<String> },
    #[error("assessment output could not be deserialized: {0}")]
    Deserialize(#[source] serde_json::Error),
}

pub fn validate_assessment_value(
    payload: &Value,
) -> Result<SecurityAssessment, OutputValidationError> {
    let validator = assessment_validator()?;

    if let Err(validation_errors) = validator.validate(payload) {
        let errors = validation_errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>();
        return Err(OutputValidationError::SchemaViolation { errors });
    }

    serde_json::from_value(payload.clone()).map_err(OutputValidationError::Deserialize)
}

static ASSESSMENT_VALIDATOR: LazyLock<Result<JSONSchema, String>> = LazyLock::new(|| {
    let schema = output_schema().map_err(|err| err.to_string())?;
    JSONSchema::compile(&schema).map_err(|err| err.to_string())
});

fn assessment_validator() -> Result<&'static JSONSchema, OutputValidationError> {
    ASSESSMENT_VALIDATOR
        .as_ref()
        .map_err(|message| OutputValidationError::SchemaCompile(message.clone()))
}
