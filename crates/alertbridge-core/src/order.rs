//! Order-related types and identifiers.
//!
//! Provides order side, kind, time-in-force, client order ID and the
//! `OrderIntent` handed to the brokerage.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::decimal::Price;
use crate::error::CoreError;

/// Order side derived from an alert's `strategy` field.
///
/// Values other than `buy`/`sell` are carried verbatim in `Other` and passed
/// through to the brokerage, which decides whether to accept them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum OrderSide {
    Buy,
    Sell,
    Other(String),
}

impl OrderSide {
    /// Map a strategy string case-insensitively.
    pub fn from_strategy(strategy: &str) -> Self {
        let normalized = strategy.to_lowercase();
        match normalized.as_str() {
            "buy" => Self::Buy,
            "sell" => Self::Sell,
            _ => Self::Other(normalized),
        }
    }

    /// Wire representation sent to the brokerage.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
            Self::Other(raw) => raw,
        }
    }

    /// True for the two sides the brokerage is known to accept.
    pub fn is_recognized(&self) -> bool {
        !matches!(self, Self::Other(_))
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for OrderSide {
    fn from(s: String) -> Self {
        Self::from_strategy(&s)
    }
}

impl From<OrderSide> for String {
    fn from(side: OrderSide) -> Self {
        side.as_str().to_string()
    }
}

/// Order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderKind {
    /// Market order (regular session).
    Market,
    /// Limit order priced from the latest quote (extended session).
    Limit,
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Market => write!(f, "market"),
            Self::Limit => write!(f, "limit"),
        }
    }
}

/// Time-in-force for orders, in brokerage wire form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeInForce {
    /// Valid for the current trading day only.
    #[serde(rename = "day")]
    Day,
    /// Good-till-canceled.
    #[default]
    #[serde(rename = "gtc")]
    GoodTillCanceled,
    /// Immediate-or-cancel.
    #[serde(rename = "ioc")]
    ImmediateOrCancel,
    /// Fill-or-kill.
    #[serde(rename = "fok")]
    FillOrKill,
}

impl fmt::Display for TimeInForce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Day => write!(f, "day"),
            Self::GoodTillCanceled => write!(f, "gtc"),
            Self::ImmediateOrCancel => write!(f, "ioc"),
            Self::FillOrKill => write!(f, "fok"),
        }
    }
}

/// Client order ID used to correlate log lines with brokerage orders.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ClientOrderId(String);

impl ClientOrderId {
    /// Create a new unique client order ID.
    ///
    /// Format: `ab_{timestamp_ms}_{uuid_short}`
    pub fn new() -> Self {
        let ts = chrono::Utc::now().timestamp_millis();
        let uuid_short = &Uuid::new_v4().simple().to_string()[..8];
        Self(format!("ab_{ts}_{uuid_short}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ClientOrderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ClientOrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Fully specified order derived from an alert and the trading session.
///
/// Invariant: `kind == Limit` implies `limit_price.is_some()` and
/// `extended_hours`; `kind == Market` implies `limit_price.is_none()`.
/// The constructors uphold it; `check_invariants` verifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub client_order_id: ClientOrderId,
    pub symbol: String,
    pub side: OrderSide,
    pub quantity: u32,
    pub kind: OrderKind,
    pub limit_price: Option<Price>,
    pub time_in_force: TimeInForce,
    pub extended_hours: bool,
}

impl OrderIntent {
    /// Regular-session market order.
    pub fn market(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: u32,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            client_order_id: ClientOrderId::new(),
            symbol: symbol.into(),
            side,
            quantity,
            kind: OrderKind::Market,
            limit_price: None,
            time_in_force,
            extended_hours: false,
        }
    }

    /// Extended-hours limit order at `limit_price`.
    pub fn extended_limit(
        symbol: impl Into<String>,
        side: OrderSide,
        quantity: u32,
        limit_price: Price,
        time_in_force: TimeInForce,
    ) -> Self {
        Self {
            client_order_id: ClientOrderId::new(),
            symbol: symbol.into(),
            side,
            quantity,
            kind: OrderKind::Limit,
            limit_price: Some(limit_price),
            time_in_force,
            extended_hours: true,
        }
    }

    /// Verify the kind/limit-price/extended-hours invariant.
    pub fn check_invariants(&self) -> Result<(), CoreError> {
        match (self.kind, self.limit_price, self.extended_hours) {
            (OrderKind::Market, None, _) => Ok(()),
            (OrderKind::Market, Some(px), _) => Err(CoreError::InvalidIntent(format!(
                "market order {} carries limit price {px}",
                self.client_order_id
            ))),
            (OrderKind::Limit, Some(_), true) => Ok(()),
            (OrderKind::Limit, None, _) => Err(CoreError::InvalidIntent(format!(
                "limit order {} has no limit price",
                self.client_order_id
            ))),
            (OrderKind::Limit, Some(_), false) => Err(CoreError::InvalidIntent(format!(
                "limit order {} is not flagged for extended hours",
                self.client_order_id
            ))),
        }
    }
}
