//! Brokerage access for alertbridge.
//!
//! Wraps the Alpaca REST API behind the [`Brokerage`] trait: order submission
//! and latest-quote lookup. [`MockBrokerage`] stands in for it in tests.

pub mod brokerage;
pub mod client;
pub mod error;
pub mod mock;
pub mod wire;

pub use brokerage::{limit_price_for, BoxFuture, Brokerage, OrderAck};
pub use client::{AlpacaClient, BrokerConfig, DEFAULT_DATA_URL, DEFAULT_TIMEOUT, DEFAULT_TRADING_URL};
pub use error::{BrokerError, BrokerResult};
pub use mock::MockBrokerage;
