//! LLM configuration parsed from environment variables.

use super::types::{LlmError, Sampling};

pub const DEFAULT_LLAMA_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_LLAMA_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_TEMPERATURE: f64 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;
pub const DEFAULT_TOP_P: f64 = 1.0;
pub const DEFAULT_LLM_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_LLM_CONNECT_TIMEOUT_SECS: u64 = 10;

const API_KEY_VAR: &str = "GROQ_API_KEY";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LlmTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

/// Model and sampling used when a request does not override them.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatDefaults {
    pub model: String,
    pub sampling: Sampling,
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            model: DEFAULT_LLAMA_MODEL.to_owned(),
            sampling: Sampling {
                temperature: DEFAULT_TEMPERATURE,
                max_tokens: DEFAULT_MAX_TOKENS,
                top_p: DEFAULT_TOP_P,
            },
        }
    }
}

impl ChatDefaults {
    /// Read model and sampling defaults from the environment.
    ///
    /// - `LLAMA_MODEL`: default `llama3-70b-8192`
    /// - `LLAMA_TEMPERATURE`: default 0.7
    /// - `LLAMA_MAX_TOKENS`: default 1000
    /// - `LLAMA_TOP_P`: default 1
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::ConfigParse`] when a numeric variable is set but
    /// does not parse.
    pub fn from_env() -> Result<Self, LlmError> {
        let model = std::env::var("LLAMA_MODEL")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LLAMA_MODEL.to_owned());
        let sampling = Sampling {
            temperature: env_parse("LLAMA_TEMPERATURE", DEFAULT_TEMPERATURE)?,
            max_tokens: env_parse("LLAMA_MAX_TOKENS", DEFAULT_MAX_TOKENS)?,
            top_p: env_parse("LLAMA_TOP_P", DEFAULT_TOP_P)?,
        };
        Ok(Self { model, sampling })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeouts: LlmTimeouts,
}

impl LlmConfig {
    /// Build typed LLM client config from environment variables.
    ///
    /// Required:
    /// - `GROQ_API_KEY`
    ///
    /// Optional:
    /// - `LLAMA_BASE_URL`: default Groq OpenAI-compatible endpoint
    /// - `LLM_REQUEST_TIMEOUT_SECS`: default 120
    /// - `LLM_CONNECT_TIMEOUT_SECS`: default 10
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or a timeout does not parse.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_VAR)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| LlmError::MissingApiKey { var: API_KEY_VAR.into() })?;

        let base_url = std::env::var("LLAMA_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_LLAMA_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let timeouts = LlmTimeouts {
            request_secs: env_parse("LLM_REQUEST_TIMEOUT_SECS", DEFAULT_LLM_REQUEST_TIMEOUT_SECS)?,
            connect_secs: env_parse("LLM_CONNECT_TIMEOUT_SECS", DEFAULT_LLM_CONNECT_TIMEOUT_SECS)?,
        };

        Ok(Self { api_key, base_url, timeouts })
    }
}

fn env_parse<T>(key: &str, default: T) -> Result<T, LlmError>
where
    T: std::str::FromStr,
{
    match std::env::var(key) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|_| LlmError::ConfigParse(format!("{key}: invalid value '{raw}'"))),
        _ => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
