//! Brokerage abstraction.
//!
//! The trait is dyn-compatible so the pipeline can hold an
//! `Arc<dyn Brokerage>` and tests can swap in [`crate::MockBrokerage`].

use std::pin::Pin;

use alertbridge_core::{OrderIntent, OrderSide, Price, Quote};
use serde::{Deserialize, Serialize};

use crate::error::{BrokerError, BrokerResult};

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Brokerage acknowledgement of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAck {
    /// Brokerage-assigned order ID.
    pub id: String,
    /// Echo of the client order ID, when the brokerage returns it.
    #[serde(default)]
    pub client_order_id: Option<String>,
    /// Order status as reported at submission (e.g. "accepted", "new").
    pub status: String,
}

/// Order submission and market data access.
pub trait Brokerage: Send + Sync {
    /// Submit an order. Resolves once the brokerage has accepted or refused it.
    fn submit_order<'a>(&'a self, intent: &'a OrderIntent) -> BoxFuture<'a, BrokerResult<OrderAck>>;

    /// Fetch the latest bid/ask for `symbol`.
    fn latest_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, BrokerResult<Quote>>;
}

/// Limit price for `side` taken from `quote`.
///
/// Buys use the ask, everything else the bid. The chosen side must be
/// strictly positive.
pub fn limit_price_for(symbol: &str, quote: &Quote, side: &OrderSide) -> BrokerResult<Price> {
    let price = quote.price_for(side);
    if price.is_positive() {
        Ok(price)
    } else {
        Err(BrokerError::InvalidQuote {
            symbol: symbol.to_string(),
            reason: format!("{side} side price {price} is not positive"),
        })
    }
}
