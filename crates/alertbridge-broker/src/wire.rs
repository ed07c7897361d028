//! Alpaca REST wire formats.

use alertbridge_core::{OrderIntent, Price, Quote};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::brokerage::OrderAck;

/// Body of `POST /v2/orders`.
///
/// Quantities and prices are sent as strings, which Alpaca accepts and which
/// keeps decimal prices exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlpacaOrderRequest {
    pub symbol: String,
    pub qty: String,
    pub side: String,
    #[serde(rename = "type")]
    pub order_type: String,
    pub time_in_force: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit_price: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_hours: Option<bool>,
    pub client_order_id: String,
}

impl From<&OrderIntent> for AlpacaOrderRequest {
    fn from(intent: &OrderIntent) -> Self {
        Self {
            symbol: intent.symbol.clone(),
            qty: intent.quantity.to_string(),
            side: intent.side.as_str().to_string(),
            order_type: intent.kind.to_string(),
            time_in_force: intent.time_in_force.to_string(),
            limit_price: intent.limit_price.map(|px| px.to_string()),
            extended_hours: intent.extended_hours.then_some(true),
            client_order_id: intent.client_order_id.as_str().to_string(),
        }
    }
}

/// Subset of the order object returned by `POST /v2/orders`.
#[derive(Debug, Clone, Deserialize)]
pub struct AlpacaOrderResponse {
    pub id: String,
    #[serde(default)]
    pub client_order_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<AlpacaOrderResponse> for OrderAck {
    fn from(resp: AlpacaOrderResponse) -> Self {
        Self {
            id: resp.id,
            client_order_id: resp.client_order_id,
            status: resp.status.unwrap_or_else(|| "unknown".to_string()),
        }
    }
}

/// Response of `GET /v2/stocks/{symbol}/quotes/latest`.
#[derive(Debug, Clone, Deserialize)]
pub struct LatestQuoteResponse {
    pub quote: RawQuote,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawQuote {
    /// Bid price.
    #[serde(rename = "bp")]
    pub bid_price: Decimal,
    /// Ask price.
    #[serde(rename = "ap")]
    pub ask_price: Decimal,
}

impl From<RawQuote> for Quote {
    fn from(raw: RawQuote) -> Self {
        Quote::new(Price::new(raw.bid_price), Price::new(raw.ask_price))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertbridge_core::{OrderSide, TimeInForce};
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_request_omits_limit_fields() {
        let intent = OrderIntent::market("AAPL", OrderSide::Buy, 1, TimeInForce::GoodTillCanceled);
        let body = serde_json::to_value(AlpacaOrderRequest::from(&intent)).unwrap();

        assert_eq!(body["symbol"], "AAPL");
        assert_eq!(body["qty"], "1");
        assert_eq!(body["side"], "buy");
        assert_eq!(body["type"], "market");
        assert_eq!(body["time_in_force"], "gtc");
        assert!(body.get("limit_price").is_none());
        assert!(body.get("extended_hours").is_none());
        assert_eq!(body["client_order_id"], intent.client_order_id.as_str());
    }

    #[test]
    fn test_extended_limit_request() {
        let intent = OrderIntent::extended_limit(
            "AAPL",
            OrderSide::Sell,
            1,
            Price::new(dec!(100.00)),
            TimeInForce::GoodTillCanceled,
        );
        let body = serde_json::to_value(AlpacaOrderRequest::from(&intent)).unwrap();

        assert_eq!(body["type"], "limit");
        assert_eq!(body["side"], "sell");
        assert_eq!(body["limit_price"], "100");
        assert_eq!(body["extended_hours"], true);
    }

    #[test]
    fn test_pass_through_side_is_verbatim() {
        let intent = OrderIntent::market(
            "AAPL",
            OrderSide::Other("close".to_string()),
            1,
            TimeInForce::GoodTillCanceled,
        );
        assert_eq!(AlpacaOrderRequest::from(&intent).side, "close");
    }

    #[test]
    fn test_parse_latest_quote() {
        let raw = r#"{
            "symbol": "AAPL",
            "quote": {"t": "2026-02-09T23:00:00Z", "ax": "V", "ap": 187.25, "as": 2, "bx": "V", "bp": 187.1, "bs": 3}
        }"#;
        let resp: LatestQuoteResponse = serde_json::from_str(raw).unwrap();
        let quote = Quote::from(resp.quote);
        assert_eq!(quote.ask_price, Price::new(dec!(187.25)));
        assert_eq!(quote.bid_price, Price::new(dec!(187.1)));
    }

    #[test]
    fn test_order_response_to_ack() {
        let raw = r#"{"id": "61e69015", "client_order_id": "ab_1", "status": "accepted", "symbol": "AAPL"}"#;
        let ack = OrderAck::from(serde_json::from_str::<AlpacaOrderResponse>(raw).unwrap());
        assert_eq!(ack.id, "61e69015");
        assert_eq!(ack.client_order_id.as_deref(), Some("ab_1"));
        assert_eq!(ack.status, "accepted");
    }
}
