use std::env;

use crate::error::{Result, SummarizeError};

pub const API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const MODEL_VAR: &str = "OPENAI_MODEL";

/// Completion-endpoint credentials and model choice, read once at startup
/// and passed by value into the composer.
#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub model: String,
}

impl Config {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_values(env::var(API_KEY_VAR).ok(), env::var(MODEL_VAR).ok())
    }

    /// Build the configuration from already-read values. Empty strings count
    /// as missing.
    pub fn from_values(api_key: Option<String>, model: Option<String>) -> Result<Self> {
        let api_key = api_key
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SummarizeError::Config(format!("{API_KEY_VAR} is not set")))?;
        let model = model
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SummarizeError::Config(format!("{MODEL_VAR} is not set")))?;

        Ok(Self { api_key, model })
    }
}
