//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! The Llama proxy lives under `/api/llama`; `/api/chat` is the bare relay
//! without a system prompt and `/api/health` is the liveness probe. CORS is
//! wide open for the browser front end.

pub mod llama;

use axum::Router;
use axum::http::{Method, header};
use axum::response::Json;
use axum::routing::{get, post};
use serde_json::{Value, json};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the full HTTP router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    let llama_routes = Router::new()
        .route("/send", post(llama::send_message))
        .route("/history/{id}", get(llama::conversation_history))
        .route("/conversations", get(llama::conversations));

    Router::new()
        .nest("/api/llama", llama_routes)
        .route("/api/chat", post(llama::direct_chat))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "OK", "message": "Llama API Server is running" }))
}
