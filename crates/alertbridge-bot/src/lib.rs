//! alertbridge - TradingView webhook to Alpaca order bot.
//!
//! Orchestrates the components:
//! - Webhook intake (validation, passphrase check)
//! - Alert queue and paced queue worker
//! - Session-aware order routing
//! - Alpaca brokerage client

pub mod app;
pub mod config;
pub mod error;

pub use app::{Application, Components};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
