//! Error types for alertbridge-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid order intent: {0}")]
    InvalidIntent(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
