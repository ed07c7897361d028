//! Brokerage error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Brokerage API error (HTTP {status}): {body}")]
    Api { status: u16, body: String },

    #[error("Response decode error: {0}")]
    Decode(String),

    #[error("Invalid quote for {symbol}: {reason}")]
    InvalidQuote { symbol: String, reason: String },

    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    #[error("Mock failure: {0}")]
    Scripted(String),
}

impl BrokerError {
    /// Short cause label for failure logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HttpClient(_) => "transport",
            Self::Api { .. } => "api",
            Self::Decode(_) => "decode",
            Self::InvalidQuote { .. } => "invalid_quote",
            Self::InvalidOrder(_) => "invalid_order",
            Self::Scripted(_) => "scripted",
        }
    }
}

pub type BrokerResult<T> = Result<T, BrokerError>;
