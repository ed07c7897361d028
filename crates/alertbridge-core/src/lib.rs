//! Core domain types for alertbridge.
//!
//! This crate provides the pure, I/O-free part of the alert pipeline:
//! - `Alert` and `AlertValidator`: inbound signal parsing and authentication
//! - `Session`: regular vs. extended hours classification in exchange time
//! - `OrderIntent`: fully specified order parameters handed to the brokerage
//! - `Price`, `Quote`: precision-safe pricing types

pub mod alert;
pub mod decimal;
pub mod error;
pub mod order;
pub mod quote;
pub mod session;

pub use alert::{Alert, AlertValidator, PassphrasePolicy, Rejection};
pub use decimal::Price;
pub use error::{CoreError, Result};
pub use order::{ClientOrderId, OrderIntent, OrderKind, OrderSide, TimeInForce};
pub use quote::Quote;
pub use session::{current_session, session_at, Clock, FixedClock, Session, SystemClock};
