//! Classify, route and submit a single alert.

use std::sync::Arc;
use std::time::Instant;

use alertbridge_broker::{Brokerage, OrderAck};
use alertbridge_core::{current_session, Alert, Clock, OrderIntent, Session};
use alertbridge_telemetry::Metrics;
use tracing::debug;

use crate::error::{ExecutorError, ExecutorResult};
use crate::router::OrderRouter;

/// Outcome of a successfully submitted alert.
#[derive(Debug, Clone)]
pub struct ExecutionReport {
    pub intent: OrderIntent,
    pub session: Session,
    pub ack: OrderAck,
}

/// Session classification, routing and submission for one alert.
///
/// The session is read from the clock on every call, never cached.
pub struct OrderPipeline {
    router: OrderRouter,
    broker: Arc<dyn Brokerage>,
    clock: Arc<dyn Clock>,
}

impl OrderPipeline {
    pub fn new(router: OrderRouter, broker: Arc<dyn Brokerage>, clock: Arc<dyn Clock>) -> Self {
        Self {
            router,
            broker,
            clock,
        }
    }

    pub fn router(&self) -> &OrderRouter {
        &self.router
    }

    /// Execute `alert` against the brokerage.
    pub async fn execute(&self, alert: &Alert) -> ExecutorResult<ExecutionReport> {
        let session = current_session(self.clock.as_ref());
        debug!(symbol = %alert.ticker, strategy = %alert.strategy, %session, "Routing alert");

        let intent = match self.router.route(alert, session, self.broker.as_ref()).await {
            Ok(intent) => intent,
            Err(e) => {
                Metrics::order_failed(e.failure_reason());
                return Err(e);
            }
        };

        let kind = intent.kind.to_string();
        let started = Instant::now();
        let result = self.broker.submit_order(&intent).await;
        Metrics::order_submit_latency(&kind, started.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(ack) => {
                Metrics::order_submitted(&kind, side_label(&intent));
                Ok(ExecutionReport {
                    intent,
                    session,
                    ack,
                })
            }
            Err(source) => {
                let err = ExecutorError::OrderSubmissionFailed {
                    symbol: intent.symbol.clone(),
                    source,
                };
                Metrics::order_failed(err.failure_reason());
                Err(err)
            }
        }
    }
}

/// Bounded metric label for the order side.
fn side_label(intent: &OrderIntent) -> &str {
    if intent.side.is_recognized() {
        intent.side.as_str()
    } else {
        "other"
    }
}
