//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor.
//! It holds the optional LLM client and the chat defaults. Nothing in it is
//! mutated after startup, so requests never contend on it.

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::llm::config::ChatDefaults;

/// Shared application state, injected into Axum handlers via State extractor.
#[derive(Clone)]
pub struct AppState {
    /// Optional LLM client. `None` if the API key is not configured.
    pub llm: Option<Arc<dyn LlmChat>>,
    /// Model and sampling used when a request does not override them.
    pub defaults: Arc<ChatDefaults>,
}

impl AppState {
    #[must_use]
    pub fn new(llm: Option<Arc<dyn LlmChat>>, defaults: ChatDefaults) -> Self {
        Self { llm, defaults: Arc::new(defaults) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
