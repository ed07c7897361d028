//! Webhook server configuration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::IntakeError;

/// How accepted alerts are handed to the order pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DispatchMode {
    /// Enqueue and answer immediately; the queue worker submits later.
    #[default]
    #[serde(alias = "queue")]
    Queued,
    /// Execute inline and answer with the brokerage outcome.
    #[serde(alias = "sync")]
    Immediate,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Queued => write!(f, "queued"),
            Self::Immediate => write!(f, "immediate"),
        }
    }
}

impl FromStr for DispatchMode {
    type Err = IntakeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queued" | "queue" => Ok(Self::Queued),
            "immediate" | "sync" => Ok(Self::Immediate),
            other => Err(IntakeError::InvalidMode(other.to_string())),
        }
    }
}

/// Webhook server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Port to listen on (all interfaces).
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log every inbound payload (passphrase redacted).
    #[serde(default)]
    pub debug: bool,
    #[serde(default, rename = "dispatch_mode")]
    pub mode: DispatchMode,
}

fn default_port() -> u16 {
    10000
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            debug: false,
            mode: DispatchMode::default(),
        }
    }
}
