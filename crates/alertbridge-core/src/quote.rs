//! Latest best bid/offer snapshot used to price extended-hours orders.

use serde::{Deserialize, Serialize};

use crate::decimal::Price;
use crate::order::OrderSide;

/// Current best bid/ask for a symbol.
///
/// Fetched fresh for every extended-hours order and never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    /// Best bid price.
    pub bid_price: Price,
    /// Best ask price.
    pub ask_price: Price,
}

impl Quote {
    pub fn new(bid_price: Price, ask_price: Price) -> Self {
        Self {
            bid_price,
            ask_price,
        }
    }

    /// Price a limit order on `side` would cross at.
    ///
    /// Buys pay the ask; sells and pass-through sides use the bid.
    pub fn price_for(&self, side: &OrderSide) -> Price {
        match side {
            OrderSide::Buy => self.ask_price,
            OrderSide::Sell | OrderSide::Other(_) => self.bid_price,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_quote() -> Quote {
        Quote::new(Price::new(dec!(100.00)), Price::new(dec!(100.50)))
    }

    #[test]
    fn test_buy_uses_ask() {
        assert_eq!(
            sample_quote().price_for(&OrderSide::Buy),
            Price::new(dec!(100.50))
        );
    }

    #[test]
    fn test_sell_uses_bid() {
        assert_eq!(
            sample_quote().price_for(&OrderSide::Sell),
            Price::new(dec!(100.00))
        );
    }

    #[test]
    fn test_other_side_uses_bid() {
        let side = OrderSide::Other("short".to_string());
        assert_eq!(sample_quote().price_for(&side), Price::new(dec!(100.00)));
    }
}
