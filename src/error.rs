//! Shared error classification.
//!
//! Each module owns its own `thiserror` enum. This trait gives handlers and
//! log lines a stable machine-readable code for any of them.

pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
