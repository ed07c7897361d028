//! Inbound alert parsing and authentication.
//!
//! `AlertValidator` is a pure function over the parsed JSON body of a webhook
//! call: it either yields an [`Alert`] or a classified [`Rejection`]. It does
//! no I/O and holds no mutable state.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::order::OrderSide;

/// A trade signal received from the charting service.
///
/// Immutable once created. `strategy` is stored lower-cased.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub ticker: String,
    pub strategy: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

impl std::fmt::Debug for Alert {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alert")
            .field("ticker", &self.ticker)
            .field("strategy", &self.strategy)
            .field("passphrase", &self.passphrase.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl Alert {
    /// Order side requested by this alert.
    pub fn side(&self) -> OrderSide {
        OrderSide::from_strategy(&self.strategy)
    }
}

/// Why an inbound payload was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    /// Passphrase enforcement is on and the payload did not match.
    #[error("Invalid passphrase")]
    Unauthorized,
    /// Payload is not an object, or `ticker`/`strategy` is missing or not a string.
    #[error("Missing required fields")]
    BadRequest,
}

impl Rejection {
    /// Message returned to the caller.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Invalid passphrase",
            Self::BadRequest => "Missing required fields",
        }
    }

    /// HTTP status code for this rejection.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized => 403,
            Self::BadRequest => 400,
        }
    }
}

/// Shared-secret policy for inbound alerts.
#[derive(Clone, PartialEq, Eq)]
pub enum PassphrasePolicy {
    /// Payload `passphrase` must equal the secret exactly.
    Enforced(String),
    /// Passphrase content is ignored entirely.
    Disabled,
}

impl std::fmt::Debug for PassphrasePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Enforced(_) => f.write_str("Enforced(<redacted>)"),
            Self::Disabled => f.write_str("Disabled"),
        }
    }
}

/// Validates and authenticates inbound alert payloads.
#[derive(Debug, Clone)]
pub struct AlertValidator {
    policy: PassphrasePolicy,
}

impl AlertValidator {
    pub fn new(policy: PassphrasePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &PassphrasePolicy {
        &self.policy
    }

    /// Validate a parsed payload.
    ///
    /// Checks run in this order: object shape, passphrase, required fields.
    pub fn validate(&self, payload: &Value) -> Result<Alert, Rejection> {
        let obj = payload.as_object().ok_or(Rejection::BadRequest)?;

        let passphrase = obj
            .get("passphrase")
            .and_then(Value::as_str)
            .map(str::to_owned);

        if let PassphrasePolicy::Enforced(secret) = &self.policy {
            let supplied = passphrase.as_deref().unwrap_or_default();
            if passphrase.is_none() || !constant_time_eq(supplied.as_bytes(), secret.as_bytes()) {
                return Err(Rejection::Unauthorized);
            }
        }

        let ticker = obj
            .get("ticker")
            .and_then(Value::as_str)
            .ok_or(Rejection::BadRequest)?;
        let strategy = obj
            .get("strategy")
            .and_then(Value::as_str)
            .ok_or(Rejection::BadRequest)?;

        Ok(Alert {
            ticker: ticker.to_string(),
            strategy: strategy.to_lowercase(),
            passphrase,
        })
    }
}

/// Byte comparison whose running time does not depend on where inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
