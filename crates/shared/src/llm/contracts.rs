use schemars::{JsonSchema, schema_for};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value, json};

/// The structured verdict the model is asked to return. Values are passed
/// through untouched: `risk_score` carries no bounds and `threat_level` is
/// free text.
///
/// Unknown fields are rejected, which is stricter than a model class that
/// silently drops extras; a reply that grows fields is treated as
/// non-conformant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SecurityAssessment {
    /// Draft-07 `integer` admits `7.0`, so decoding does too.
    #[serde(deserialize_with = "integral_number")]
    #[schemars(with = "i64")]
    pub risk_score: i64,
    pub threat_level: String,
    pub tactics: Vec<String>,
    pub triggers: Vec<String>,
    pub dissonance_report: String,
    pub mitigation_steps: String,
}

fn integral_number<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let number = Number::deserialize(deserializer)?;
    if let Some(value) = number.as_i64() {
        return Ok(value);
    }

    match number.as_f64() {
        Some(value)
            if value.fract() == 0.0 && value >= i64::MIN as f64 && value < i64::MAX as f64 =>
        {
            Ok(value as i64)
        }
        _ => Err(D::Error::custom(format!(
            "expected an integral number, got {number}"
        ))),
    }
}

/// Draft-07 JSON schema used to validate model replies.
pub fn output_schema() -> Result<Value, serde_json::Error> {
    serde_json::to_value(schema_for!(SecurityAssessment))
}

/// The same contract in the OpenAPI subset Gemini accepts for
/// `generationConfig.responseSchema`. `propertyOrdering` pins the field order
/// the model emits.
pub fn provider_response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "risk_score": { "type": "INTEGER" },
            "threat_level": { "type": "STRING" },
            "tactics": { "type": "ARRAY", "items": { "type": "STRING" } },
            "triggers": { "type": "ARRAY", "items": { "type": "STRING" } },
            "dissonance_report": { "type": "STRING" },
            "mitigation_steps": { "type": "STRING" }
        },
        "required": [
            "risk_score",
            "threat_level",
            "tactics",
            "triggers",
            "dissonance_report",
            "mitigation_steps"
        ],
        "propertyOrdering": [
            "risk_score",
            "threat_level",
            "tactics",
            "triggers",
            "dissonance_report",
            "mitigation_steps"
        ]
    })
}
