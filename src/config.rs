//! Process configuration read from environment variables.
//!
//! `main` loads a `.env` file through `dotenvy` first, so every value here
//! can come from either the real environment or that file.

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_AUTH_API_URL: &str = "http://localhost:3000/api";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key}: invalid value '{value}'")]
    Invalid { key: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Listen port for the chat proxy (`PORT`).
    pub port: u16,
    /// Base URL of the authentication service (`AUTH_API_URL`).
    pub auth_api_url: String,
}

impl ServerConfig {
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when `PORT` is set but not a valid port.
    pub fn from_env() -> Result<Self, ConfigError> {
        let port = match std::env::var("PORT") {
            Ok(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { key: "PORT", value: raw.clone() })?,
            _ => DEFAULT_PORT,
        };
        let auth_api_url = std::env::var("AUTH_API_URL")
            .unwrap_or_else(|_| DEFAULT_AUTH_API_URL.to_owned())
            .trim_end_matches('/')
            .to_owned();
        Ok(Self { port, auth_api_url })
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
