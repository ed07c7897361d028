//! Executor error types.

use alertbridge_broker::BrokerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Order submission failed for {symbol}: {source}")]
    OrderSubmissionFailed {
        symbol: String,
        #[source]
        source: BrokerError,
    },

    #[error("Quote fetch failed for {symbol}: {source}")]
    QuoteFetchFailed {
        symbol: String,
        #[source]
        source: BrokerError,
    },

    #[error("Alert queue is closed")]
    QueueClosed,

    #[error("Worker task failed: {0}")]
    WorkerJoin(String),
}

impl ExecutorError {
    /// True for any failure to get an order accepted, including quote lookup.
    #[must_use]
    pub fn is_submission_failure(&self) -> bool {
        matches!(
            self,
            Self::OrderSubmissionFailed { .. } | Self::QuoteFetchFailed { .. }
        )
    }

    /// Brokerage-side cause, when the failure came from the brokerage.
    pub fn broker_error_kind(&self) -> Option<&'static str> {
        match self {
            Self::OrderSubmissionFailed { source, .. } | Self::QuoteFetchFailed { source, .. } => {
                Some(source.kind())
            }
            Self::QueueClosed | Self::WorkerJoin(_) => None,
        }
    }

    /// Short label for metrics.
    pub fn failure_reason(&self) -> &'static str {
        match self {
            Self::OrderSubmissionFailed { .. } => "submission",
            Self::QuoteFetchFailed { .. } => "quote",
            Self::QueueClosed => "queue_closed",
            Self::WorkerJoin(_) => "worker",
        }
    }
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;
