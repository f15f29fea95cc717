use std::sync::Arc;

use aley::config::ServerConfig;
use aley::llm::config::ChatDefaults;
use aley::llm::{LlmChat, LlmClient};
use aley::{routes, state};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid server configuration");
            std::process::exit(1);
        }
    };
    let defaults = match ChatDefaults::from_env() {
        Ok(defaults) => defaults,
        Err(e) => {
            tracing::error!(error = %e, "invalid chat configuration");
            std::process::exit(1);
        }
    };

    // Non-fatal: chat endpoints answer 500 until an API key is configured.
    let llm: Option<Arc<dyn LlmChat>> = match LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = %defaults.model, base_url = client.base_url(), "LLM client initialized");
            Some(Arc::new(client))
        }
        Err(e) => {
            tracing::warn!(error = %e, "LLM client not configured; chat disabled");
            None
        }
    };

    let app = routes::app(state::AppState::new(llm, defaults));
    let listener = match tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, port = config.port, "failed to bind");
            std::process::exit(1);
        }
    };

    tracing::info!(port = config.port, auth_api_url = %config.auth_api_url, "aley llama proxy listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "server failed");
        std::process::exit(1);
    }
}
