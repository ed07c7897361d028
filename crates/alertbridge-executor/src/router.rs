//! Alert to order translation.
//!
//! Regular session: market order. Extended session: limit order at the
//! latest quote (ask for buys, bid otherwise) flagged for extended hours.

use alertbridge_broker::{limit_price_for, Brokerage};
use alertbridge_core::{Alert, OrderIntent, Session, TimeInForce};
use tracing::debug;

use crate::error::{ExecutorError, ExecutorResult};

/// Builds an [`OrderIntent`] for an alert in a given session.
#[derive(Debug, Clone, Copy)]
pub struct OrderRouter {
    quantity: u32,
    time_in_force: TimeInForce,
}

impl Default for OrderRouter {
    fn default() -> Self {
        Self::new(1, TimeInForce::GoodTillCanceled)
    }
}

impl OrderRouter {
    pub fn new(quantity: u32, time_in_force: TimeInForce) -> Self {
        Self {
            quantity,
            time_in_force,
        }
    }

    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    pub fn time_in_force(&self) -> TimeInForce {
        self.time_in_force
    }

    /// Route `alert` for `session`.
    ///
    /// Only the extended session touches the brokerage (one quote fetch).
    pub async fn route(
        &self,
        alert: &Alert,
        session: Session,
        broker: &dyn Brokerage,
    ) -> ExecutorResult<OrderIntent> {
        let side = alert.side();

        match session {
            Session::Regular => Ok(OrderIntent::market(
                alert.ticker.as_str(),
                side,
                self.quantity,
                self.time_in_force,
            )),
            Session::Extended => {
                let quote_failed = |source| ExecutorError::QuoteFetchFailed {
                    symbol: alert.ticker.clone(),
                    source,
                };

                let quote = broker
                    .latest_quote(&alert.ticker)
                    .await
                    .map_err(quote_failed)?;
                let limit_price =
                    limit_price_for(&alert.ticker, &quote, &side).map_err(quote_failed)?;

                debug!(
                    symbol = %alert.ticker,
                    side = %side,
                    bid = %quote.bid_price,
                    ask = %quote.ask_price,
                    spread_bps = ?quote.bid_price.bps_to(quote.ask_price),
                    limit_price = %limit_price,
                    "Priced extended-hours limit order"
                );

                Ok(OrderIntent::extended_limit(
                    alert.ticker.as_str(),
                    side,
                    self.quantity,
                    limit_price,
                    self.time_in_force,
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertbridge_broker::MockBrokerage;
    use alertbridge_core::{OrderKind, OrderSide, Price, Quote};
    use rust_decimal_macros::dec;

    fn alert(ticker: &str, strategy: &str) -> Alert {
        Alert {
            ticker: ticker.to_string(),
            strategy: strategy.to_string(),
            passphrase: None,
        }
    }

    fn broker_with_quote() -> MockBrokerage {
        let broker = MockBrokerage::new();
        broker.set_quote(
            "AAPL",
            Quote::new(Price::new(dec!(100.00)), Price::new(dec!(100.50))),
        );
        broker
    }

    #[tokio::test]
    async fn test_regular_session_routes_market_order() {
        let broker = broker_with_quote();
        let intent = OrderRouter::default()
            .route(&alert("AAPL", "buy"), Session::Regular, &broker)
            .await
            .unwrap();

        assert_eq!(intent.kind, OrderKind::Market);
        assert_eq!(intent.side, OrderSide::Buy);
        assert_eq!(intent.quantity, 1);
        assert_eq!(intent.time_in_force, TimeInForce::GoodTillCanceled);
        assert!(intent.limit_price.is_none());
        assert!(!intent.extended_hours);
        assert!(broker.quote_requests().is_empty());
    }

    #[tokio::test]
    async fn test_extended_buy_uses_ask() {
        let broker = broker_with_quote();
        let intent = OrderRouter::default()
            .route(&alert("AAPL", "buy"), Session::Extended, &broker)
            .await
            .unwrap();

        assert_eq!(intent.kind, OrderKind::Limit);
        assert_eq!(intent.limit_price, Some(Price::new(dec!(100.50))));
        assert!(intent.extended_hours);
        assert_eq!(broker.quote_requests(), vec!["AAPL".to_string()]);
    }

    #[tokio::test]
    async fn test_extended_sell_uses_bid() {
        let broker = broker_with_quote();
        let intent = OrderRouter::default()
            .route(&alert("AAPL", "sell"), Session::Extended, &broker)
            .await
            .unwrap();

        assert_eq!(intent.limit_price, Some(Price::new(dec!(100.00))));
    }

    #[tokio::test]
    async fn test_quote_failure_maps_to_quote_fetch_failed() {
        let broker = MockBrokerage::new();
        let err = OrderRouter::default()
            .route(&alert("MSFT", "buy"), Session::Extended, &broker)
            .await
            .unwrap_err();

        assert!(matches!(err, ExecutorError::QuoteFetchFailed { .. }));
        assert!(err.is_submission_failure());
    }

    #[tokio::test]
    async fn test_zero_price_on_required_side_is_quote_failure() {
        let broker = MockBrokerage::new();
        broker.set_quote("XYZ", Quote::new(Price::ZERO, Price::new(dec!(5))));

        let err = OrderRouter::default()
            .route(&alert("XYZ", "sell"), Session::Extended, &broker)
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutorError::QuoteFetchFailed { .. }));
    }

    #[tokio::test]
    async fn test_configured_quantity_and_tif() {
        let broker = broker_with_quote();
        let router = OrderRouter::new(5, TimeInForce::Day);
        let intent = router
            .route(&alert("AAPL", "sell"), Session::Regular, &broker)
            .await
            .unwrap();

        assert_eq!(intent.quantity, 5);
        assert_eq!(intent.time_in_force, TimeInForce::Day);
    }
}
