//! alertbridge-intake - webhook HTTP surface.
//!
//! ```text
//! GET  /         -> "TradingView Webhook Bot is online."
//! POST /webhook  -> validate, then enqueue (queued) or execute (immediate)
//! GET  /metrics  -> Prometheus text exposition
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use alertbridge_intake::{run_server, IntakeConfig, IntakeState};
//!
//! let state = IntakeState::queued(validator, sender).with_debug(config.debug);
//! run_server(state, &config, shutdown_token).await?;
//! ```

mod config;
mod error;
mod server;
mod state;
mod types;

pub use config::{DispatchMode, IntakeConfig};
pub use error::{IntakeError, IntakeResult};
pub use server::{create_router, run_server};
pub use state::{Dispatcher, IntakeState};
pub use types::{WebhookResponse, ONLINE_MESSAGE};
