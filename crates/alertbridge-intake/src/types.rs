//! Webhook API types.

use serde::{Deserialize, Serialize};

/// Body returned by `GET /`.
pub const ONLINE_MESSAGE: &str = "TradingView Webhook Bot is online.";

/// JSON body returned by `POST /webhook`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookResponse {
    /// `"success"` or `"error"`.
    pub code: String,
    pub message: String,
}

impl WebhookResponse {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            code: "success".to_string(),
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            code: "error".to_string(),
            message: message.into(),
        }
    }
}
