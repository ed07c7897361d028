//! Order execution for alertbridge.
//!
//! # Key Components
//!
//! - [`OrderRouter`]: alert + session -> market or extended-hours limit order
//! - [`OrderPipeline`]: session classification, routing and submission
//! - [`alert_queue`]: unbounded FIFO between the webhook and the worker
//! - [`QueueWorker`]: sequential, paced consumer with log-and-continue failures
//! - [`WorkerHandle`]: state, counters, graceful stop and cancellation

pub mod error;
pub mod pipeline;
pub mod queue;
pub mod router;
pub mod worker;

pub use error::{ExecutorError, ExecutorResult};
pub use pipeline::{ExecutionReport, OrderPipeline};
pub use queue::{alert_queue, AlertReceiver, AlertSender, QueueItem};
pub use router::OrderRouter;
pub use worker::{QueueWorker, WorkerConfig, WorkerHandle, WorkerState, DEFAULT_PACING};
