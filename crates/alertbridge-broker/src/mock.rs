//! In-memory brokerage for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use alertbridge_core::{OrderIntent, Quote};
use parking_lot::Mutex;

use crate::brokerage::{BoxFuture, Brokerage, OrderAck};
use crate::error::{BrokerError, BrokerResult};

/// Mock brokerage for testing.
///
/// Records every submitted intent (including failed ones) and serves quotes
/// from a per-symbol table.
#[derive(Debug, Default)]
pub struct MockBrokerage {
    /// Recorded submissions for verification.
    submissions: Mutex<Vec<OrderIntent>>,
    /// Symbols passed to `latest_quote`, in call order.
    quote_requests: Mutex<Vec<String>>,
    quotes: Mutex<HashMap<String, Quote>>,
    fail_submissions: AtomicUsize,
    fail_quotes: AtomicUsize,
    submit_delay: Mutex<Option<Duration>>,
    next_id: AtomicUsize,
}

impl MockBrokerage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `quote` for `symbol`.
    pub fn set_quote(&self, symbol: impl Into<String>, quote: Quote) {
        self.quotes.lock().insert(symbol.into(), quote);
    }

    /// Fail the next `n` order submissions.
    pub fn fail_next_submissions(&self, n: usize) {
        self.fail_submissions.store(n, Ordering::SeqCst);
    }

    /// Fail the next `n` quote fetches.
    pub fn fail_next_quotes(&self, n: usize) {
        self.fail_quotes.store(n, Ordering::SeqCst);
    }

    /// Delay each submission by `delay`.
    pub fn set_submit_delay(&self, delay: Duration) {
        *self.submit_delay.lock() = Some(delay);
    }

    /// Get recorded submissions.
    pub fn submissions(&self) -> Vec<OrderIntent> {
        self.submissions.lock().clone()
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.lock().len()
    }

    /// Get symbols whose quotes were requested.
    pub fn quote_requests(&self) -> Vec<String> {
        self.quote_requests.lock().clone()
    }

    /// Clear recorded calls.
    pub fn clear(&self) {
        self.submissions.lock().clear();
        self.quote_requests.lock().clear();
    }

    async fn do_submit(&self, intent: &OrderIntent) -> BrokerResult<OrderAck> {
        let delay = *self.submit_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.submissions.lock().push(intent.clone());

        if take_failure(&self.fail_submissions) {
            return Err(BrokerError::Scripted(format!(
                "submission of {} rejected",
                intent.client_order_id
            )));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(OrderAck {
            id: format!("mock-{n}"),
            client_order_id: Some(intent.client_order_id.as_str().to_string()),
            status: "accepted".to_string(),
        })
    }

    fn do_quote(&self, symbol: &str) -> BrokerResult<Quote> {
        self.quote_requests.lock().push(symbol.to_string());

        if take_failure(&self.fail_quotes) {
            return Err(BrokerError::Scripted(format!("quote for {symbol} unavailable")));
        }

        self.quotes
            .lock()
            .get(symbol)
            .copied()
            .ok_or_else(|| BrokerError::Api {
                status: 404,
                body: format!("no quote for {symbol}"),
            })
    }
}

/// Decrement a failure budget, returning true if a failure was consumed.
fn take_failure(budget: &AtomicUsize) -> bool {
    budget
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

impl Brokerage for MockBrokerage {
    fn submit_order<'a>(&'a self, intent: &'a OrderIntent) -> BoxFuture<'a, BrokerResult<OrderAck>> {
        Box::pin(self.do_submit(intent))
    }

    fn latest_quote<'a>(&'a self, symbol: &'a str) -> BoxFuture<'a, BrokerResult<Quote>> {
        let result = self.do_quote(symbol);
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertbridge_core::{OrderSide, Price, TimeInForce};
    use rust_decimal_macros::dec;

    fn intent() -> OrderIntent {
        OrderIntent::market("AAPL", OrderSide::Buy, 1, TimeInForce::GoodTillCanceled)
    }

    #[tokio::test]
    async fn test_records_submissions() {
        let broker = MockBrokerage::new();
        let ack = broker.submit_order(&intent()).await.unwrap();
        assert_eq!(ack.id, "mock-1");
        assert_eq!(broker.submission_count(), 1);
    }

    #[tokio::test]
    async fn test_fails_next_n_submissions() {
        let broker = MockBrokerage::new();
        broker.fail_next_submissions(2);

        assert!(broker.submit_order(&intent()).await.is_err());
        assert!(broker.submit_order(&intent()).await.is_err());
        assert!(broker.submit_order(&intent()).await.is_ok());
        assert_eq!(broker.submission_count(), 3);
    }

    #[tokio::test]
    async fn test_scripted_quotes() {
        let broker = MockBrokerage::new();
        let quote = Quote::new(Price::new(dec!(10)), Price::new(dec!(10.1)));
        broker.set_quote("AAPL", quote);

        assert_eq!(broker.latest_quote("AAPL").await.unwrap(), quote);
        assert!(broker.latest_quote("MSFT").await.is_err());

        broker.fail_next_quotes(1);
        assert!(broker.latest_quote("AAPL").await.is_err());
        assert!(broker.latest_quote("AAPL").await.is_ok());
        assert_eq!(broker.quote_requests().len(), 4);
    }

    #[test]
    fn test_clear_resets_recordings() {
        let broker = MockBrokerage::new();
        tokio_test::assert_ok!(tokio_test::block_on(broker.submit_order(&intent())));
        tokio_test::assert_err!(tokio_test::block_on(broker.latest_quote("AAPL")));

        broker.clear();
        assert_eq!(broker.submission_count(), 0);
        assert!(broker.quote_requests().is_empty());
    }
}
