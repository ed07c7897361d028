//! HTTP client for the Alpaca trading and market data APIs.
//!
//! Two base URLs are used: the trading API for order submission and the
//! market data API for latest quotes. Both share one `reqwest::Client`
//! carrying the API key headers and a request timeout.

use std::time::Duration;

use alertbridge_core::{OrderIntent, Quote};
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, Response, Url};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::brokerage::{BoxFuture, Brokerage, OrderAck};
use crate::error::{BrokerError, BrokerResult};
use crate::wire::{AlpacaOrderRequest, AlpacaOrderResponse, LatestQuoteResponse};

/// Default timeout for API requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Paper trading endpoint.
pub const DEFAULT_TRADING_URL: &str = "https://paper-api.alpaca.markets";

/// Market data endpoint.
pub const DEFAULT_DATA_URL: &str = "https://data.alpaca.markets";

const KEY_ID_HEADER: &str = "APCA-API-KEY-ID";
const SECRET_KEY_HEADER: &str = "APCA-API-SECRET-KEY";

/// Connection settings for [`AlpacaClient`].
#[derive(Clone)]
pub struct BrokerConfig {
    pub key_id: String,
    pub secret_key: String,
    /// Trading API base URL, with or without a trailing `/v2`.
    pub trading_url: String,
    /// Market data API base URL.
    pub data_url: String,
    pub timeout: Duration,
}

impl BrokerConfig {
    pub fn new(key_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            key_id: key_id.into(),
            secret_key: secret_key.into(),
            trading_url: DEFAULT_TRADING_URL.to_string(),
            data_url: DEFAULT_DATA_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Point both APIs at one base URL (used against local mock servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        let url = url.into();
        self.trading_url = url.clone();
        self.data_url = url;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for BrokerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrokerConfig")
            .field("key_id", &self.key_id)
            .field("secret_key", &"<redacted>")
            .field("trading_url", &self.trading_url)
            .field("data_url", &self.data_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Alpaca REST client.
pub struct AlpacaClient {
    client: Client,
    trading_url: Url,
    data_url: Url,
}

impl AlpacaClient {
    /// Create a new client from `config`.
    pub fn new(config: &BrokerConfig) -> BrokerResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(KEY_ID_HEADER, header_value(&config.key_id, KEY_ID_HEADER)?);
        let mut secret = header_value(&config.secret_key, SECRET_KEY_HEADER)?;
        secret.set_sensitive(true);
        headers.insert(SECRET_KEY_HEADER, secret);

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| BrokerError::HttpClient(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            trading_url: parse_base(&config.trading_url)?,
            data_url: parse_base(&config.data_url)?,
        })
    }

    /// Submit an order via `POST /v2/orders`.
    pub async fn place_order(&self, intent: &OrderIntent) -> BrokerResult<OrderAck> {
        intent
            .check_invariants()
            .map_err(|e| BrokerError::InvalidOrder(e.to_string()))?;

        let url = endpoint(&self.trading_url, &["v2", "orders"])?;
        let body = AlpacaOrderRequest::from(intent);

        debug!(
            client_order_id = %intent.client_order_id,
            symbol = %intent.symbol,
            side = %intent.side,
            kind = %intent.kind,
            "Submitting order"
        );

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| BrokerError::HttpClient(format!("HTTP request failed: {e}")))?;

        let order: AlpacaOrderResponse = decode(response).await?;
        let ack = OrderAck::from(order);

        info!(
            client_order_id = %intent.client_order_id,
            order_id = %ack.id,
            status = %ack.status,
            "Order accepted by brokerage"
        );
        Ok(ack)
    }

    /// Fetch the latest quote via `GET /v2/stocks/{symbol}/quotes/latest`.
    pub async fn fetch_latest_quote(&self, symbol: &str) -> BrokerResult<Quote> {
        let url = endpoint(&self.data_url, &["v2", "stocks", symbol, "quotes", "latest"])?;

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| BrokerError::HttpClient(format!("HTTP request failed: {e}")))?;

        let latest: LatestQuoteResponse = decode(response).await?;
        let quote = Quote::from(latest.quote);

        debug!(
            symbol,
            bid = %quote.bid_price,
            ask = %quote.ask_price,
            "Fetched latest quote"
        );
        Ok(quote)
    }
}

impl Brokerage for AlpacaClient {
    fn submit_order<'a>(&'a self, intent: &'a OrderIntent) -> BoxFuture<'a, BrokerResult<OrderAck>> {
        Box::pin(self.place_order(intent))
    }

    fn latest_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, BrokerResult<Quote>> {
        Box::pin(self.fetch_latest_quote(symbol))
    }
}

/// Map non-2xx to `BrokerError::Api`, otherwise parse the JSON body.
async fn decode<T: DeserializeOwned>(response: Response) -> BrokerResult<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(BrokerError::Api {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json()
        .await
        .map_err(|e| BrokerError::Decode(format!("Failed to parse response: {e}")))
}

fn header_value(value: &str, name: &str) -> BrokerResult<HeaderValue> {
    HeaderValue::from_str(value)
        .map_err(|e| BrokerError::HttpClient(format!("Invalid {name} header value: {e}")))
}

/// Strip trailing slashes and an optional `/v2` suffix.
fn normalize_base(url: &str) -> String {
    let trimmed = url.trim_end_matches('/');
    trimmed
        .strip_suffix("/v2")
        .unwrap_or(trimmed)
        .to_string()
}

fn parse_base(url: &str) -> BrokerResult<Url> {
    Url::parse(&normalize_base(url))
        .map_err(|e| BrokerError::HttpClient(format!("Invalid base URL {url:?}: {e}")))
}

/// Append `segments` to `base`, percent-encoding each one.
fn endpoint(base: &Url, segments: &[&str]) -> BrokerResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|()| BrokerError::HttpClient(format!("Base URL {base} cannot carry a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}
