use std::env;

use thiserror::Error;

pub const DEFAULT_LLM_HOST: &str = "https://api.groq.com/openai";
pub const DEFAULT_LLM_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_SYSTEM_MESSAGE: &str = "Tu es un expert en cybersécurité (SISR). Tu aides les administrateurs et auditeurs. Tes réponses sont techniques, précises et en français.";
pub const DEFAULT_SESSION_IDLE_MINUTES: i64 = 60;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    /// The completion provider can't be reached without a key so the
    /// server refuses to start.
    #[error("Missing env var {0}. Configure the provider API key before starting.")]
    MissingApiKey(&'static str),
    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

fn db_path(storage_path: &str) -> String {
    format!("{}/db", storage_path.trim_end_matches('/'))
}

fn idle_minutes(value: Option<String>) -> Result<i64, ConfigError> {
    match value {
        None => Ok(DEFAULT_SESSION_IDLE_MINUTES),
        Some(value) => match value.trim().parse::<i64>() {
            Ok(minutes) if minutes > 0 => Ok(minutes),
            _ => Err(ConfigError::InvalidValue {
                name: "ADVISOR_SESSION_IDLE_MINUTES",
                value,
            }),
        },
    }
}

fn require_email(value: Option<String>) -> Result<bool, ConfigError> {
    match value {
        None => Ok(true),
        Some(value) => match value.to_lowercase().as_str() {
            "1" | "true" | "yes" => Ok(true),
            "0" | "false" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue {
                name: "ADVISOR_REQUIRE_EMAIL",
                value,
            }),
        },
    }
}

/// Credential store settings. Unlike `AppConfig` these don't need the
/// provider API key so account management works without it.
#[derive(Clone, Debug)]
pub struct StorageConfig {
    pub db_path: String,
    pub require_email_identifier: bool,
}

impl StorageConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let storage_path = env::var("ADVISOR_STORAGE_PATH").unwrap_or("./".to_string());
        Ok(Self {
            db_path: db_path(&storage_path),
            require_email_identifier: require_email(env::var("ADVISOR_REQUIRE_EMAIL").ok())?,
        })
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub db_path: String,
    pub llm_api_hostname: String,
    pub llm_api_key: String,
    pub llm_model: String,
    pub system_message: String,
    pub require_email_identifier: bool,
    /// Sessions untouched for this long are dropped
    pub session_idle_minutes: i64,
}

impl AppConfig {
    /// Read the config from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(|name| env::var(name).ok())
    }

    /// Build the config using `lookup` to resolve each variable.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let storage_path = lookup("ADVISOR_STORAGE_PATH").unwrap_or("./".to_string());
        let db_path = db_path(&storage_path);
        let llm_api_key = lookup("GROQ_API_KEY")
            .filter(|k| !k.trim().is_empty())
            .ok_or(ConfigError::MissingApiKey("GROQ_API_KEY"))?;
        let llm_api_hostname =
            lookup("ADVISOR_LLM_HOST").unwrap_or_else(|| DEFAULT_LLM_HOST.to_string());
        let llm_model =
            lookup("ADVISOR_LLM_MODEL").unwrap_or_else(|| DEFAULT_LLM_MODEL.to_string());
        let system_message = lookup("ADVISOR_SYSTEM_MESSAGE")
            .unwrap_or_else(|| DEFAULT_SYSTEM_MESSAGE.to_string());
        let require_email_identifier = require_email(lookup("ADVISOR_REQUIRE_EMAIL"))?;
        let session_idle_minutes = idle_minutes(lookup("ADVISOR_SESSION_IDLE_MINUTES"))?;

        Ok(Self {
            db_path,
            llm_api_hostname,
            llm_api_key,
            llm_model,
            system_message,
            require_email_identifier,
            session_idle_minutes,
        })
    }
}
