//! Intake error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("Invalid dispatch mode: {0}")]
    InvalidMode(String),
}

pub type IntakeResult<T> = Result<T, IntakeError>;
