//! LLM: client for the hosted Llama completion API.
//!
//! DESIGN
//! ======
//! Groq exposes an OpenAI-compatible `/chat/completions` endpoint, so one
//! client covers it. Handlers depend on the [`LlmChat`] trait rather than on
//! [`LlmClient`] so tests can substitute a mock.

pub mod completions;
pub mod config;
pub mod types;

use std::time::Duration;

use serde::Serialize;

use completions::{CcRequest, parse_chat_completions_response};
use config::LlmConfig;
pub use types::LlmChat;
use types::{ChatResponse, LlmError, Message, Sampling};

// =============================================================================
// CLIENT
// =============================================================================

/// Concrete completion-API client.
///
/// Configured from environment variables by [`LlmClient::from_env`].
pub struct LlmClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    /// Build an LLM client from environment variables (see [`LlmConfig::from_env`]).
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is missing or the HTTP client fails.
    pub fn from_env() -> Result<Self, LlmError> {
        let config = LlmConfig::from_env()?;
        Self::from_config(config)
    }

    /// Build an LLM client from a parsed typed config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeouts.request_secs))
            .connect_timeout(Duration::from_secs(config.timeouts.connect_secs))
            .build()
            .map_err(|e| LlmError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, api_key: config.api_key, base_url: config.base_url })
    }

    /// Return the configured API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send_json(&self, path: &str, body: &impl Serialize) -> Result<String, LlmError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| LlmError::ApiRequest(e.to_string()))?;
        if status != 200 {
            return Err(LlmError::ApiResponse { status, body: text });
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl LlmChat for LlmClient {
    async fn chat(&self, model: &str, sampling: &Sampling, messages: &[Message]) -> Result<ChatResponse, LlmError> {
        let body = CcRequest::new(model, sampling, messages);
        let text = self.send_json("/chat/completions", &body).await?;
        parse_chat_completions_response(&text)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
