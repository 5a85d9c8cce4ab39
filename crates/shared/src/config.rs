use thiserror::Error;

use crate::config_env::{optional_trimmed_env, parse_bool_env, parse_csv_list};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
const DEFAULT_HEALTH_ENGINE_LABEL: &str = "Gemini 3 High-Reasoning";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_addr: String,
    pub cors_allowed_origins: Vec<String>,
    pub health_engine_label: String,
    pub require_model_api_key: bool,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid integer in env var {0}")]
    ParseInt(String),
    #[error("invalid boolean in env var {0}")]
    ParseBool(String),
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("failed to load .env file: {0}")]
    Dotenv(String),
}

impl ApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            bind_addr: optional_trimmed_env("API_BIND_ADDR")
                .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            cors_allowed_origins: optional_trimmed_env("CORS_ALLOWED_ORIGINS")
                .map(|raw| parse_csv_list(&raw))
                .unwrap_or_default(),
            health_engine_label: optional_trimmed_env("HEALTH_ENGINE_LABEL")
                .unwrap_or_else(|| DEFAULT_HEALTH_ENGINE_LABEL.to_string()),
            require_model_api_key: parse_bool_env("GEMINI_REQUIRE_API_KEY", false)?,
            log_format: parse_log_format(optional_trimmed_env("LOG_FORMAT").as_deref())?,
        })
    }
}

/// Loads `.env` from the working directory when one exists. A missing file is
/// not an error; a malformed one is.
pub fn load_dotenv() -> Result<(), ConfigError> {
    match dotenvy::dotenv() {
        Ok(_) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(err) => Err(ConfigError::Dotenv(err.to_string())),
    }
}

fn parse_log_format(raw: Option<&str>) -> Result<LogFormat, ConfigError> {
    match raw.map(str::to_ascii_lowercase).as_deref() {
        None | Some("text") | Some("pretty") => Ok(LogFormat::Text),
        Some("json") => Ok(LogFormat::Json),
        Some(other) => Err(ConfigError::InvalidConfiguration(format!(
            "LOG_FORMAT must be 'text' or 'json', got '{other}'"
        ))),
    }
}
