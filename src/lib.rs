pub mod auth;
pub mod config;
pub mod error;
pub mod llm;
pub mod routes;
pub mod services;
pub mod state;
