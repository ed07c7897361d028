//! Queue worker.
//!
//! A single task drains the alert queue strictly in order, one alert at a
//! time, with a fixed pause after every item. Failures are logged and
//! counted; the loop always moves on to the next alert.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use alertbridge_core::Alert;
use alertbridge_telemetry::Metrics;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::error::{ExecutorError, ExecutorResult};
use crate::pipeline::{ExecutionReport, OrderPipeline};
use crate::queue::{AlertReceiver, QueueItem};

/// Default pause after each processed alert.
pub const DEFAULT_PACING: Duration = Duration::from_secs(3);

/// Worker configuration.
#[derive(Debug, Clone, Copy)]
pub struct WorkerConfig {
    /// Pause after each alert, successful or not.
    pub pacing: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            pacing: DEFAULT_PACING,
        }
    }
}

/// Observable worker state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    /// Waiting for the next alert.
    Idle,
    /// Executing an alert or pacing after it.
    Processing,
    /// Loop exited. Terminal.
    Stopped,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Processing => "processing",
            Self::Stopped => "stopped",
        }
    }
}

/// State and counters shared between the task and its handle.
#[derive(Debug)]
struct WorkerShared {
    state: RwLock<WorkerState>,
    processed: AtomicU64,
    failed: AtomicU64,
}

impl WorkerShared {
    fn set_state(&self, state: WorkerState) {
        *self.state.write() = state;
        Metrics::worker_state_set(state.as_str());
    }
}

/// Sequential consumer of the alert queue.
pub struct QueueWorker {
    receiver: AlertReceiver,
    pipeline: Arc<OrderPipeline>,
    config: WorkerConfig,
    shared: Arc<WorkerShared>,
    cancel: CancellationToken,
}

impl QueueWorker {
    pub fn new(receiver: AlertReceiver, pipeline: Arc<OrderPipeline>, config: WorkerConfig) -> Self {
        Self {
            receiver,
            pipeline,
            config,
            shared: Arc::new(WorkerShared {
                state: RwLock::new(WorkerState::Idle),
                processed: AtomicU64::new(0),
                failed: AtomicU64::new(0),
            }),
            cancel: CancellationToken::new(),
        }
    }

    /// Process a single alert: classify the session, route and submit.
    pub async fn process_one(&self, alert: &Alert) -> ExecutorResult<ExecutionReport> {
        self.pipeline.execute(alert).await
    }

    /// Start the worker loop on the Tokio runtime.
    pub fn spawn(self) -> WorkerHandle {
        let shared = self.shared.clone();
        let cancel = self.cancel.clone();
        let control = self.receiver.control();
        let join = tokio::spawn(self.run());

        WorkerHandle {
            join: Some(join),
            shared,
            cancel,
            control,
        }
    }

    async fn run(mut self) {
        info!(pacing_ms = self.config.pacing.as_millis() as u64, "Queue worker started");

        loop {
            self.shared.set_state(WorkerState::Idle);

            let item = tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    let dropped = self.receiver.depth();
                    warn!(dropped, "Queue worker cancelled");
                    break;
                }
                item = self.receiver.recv() => item,
            };

            let alert = match item {
                Some(QueueItem::Alert(alert)) => alert,
                Some(QueueItem::Shutdown) => {
                    info!("Shutdown item received");
                    break;
                }
                None => {
                    info!("Alert queue closed");
                    break;
                }
            };

            self.shared.set_state(WorkerState::Processing);
            self.handle(&alert).await;

            // Pacing applies after failures too.
            tokio::select! {
                biased;
                () = self.cancel.cancelled() => {
                    warn!("Queue worker cancelled during pacing");
                    break;
                }
                () = tokio::time::sleep(self.config.pacing) => {}
            }
        }

        self.receiver.close();
        self.shared.set_state(WorkerState::Stopped);
        info!(
            processed = self.shared.processed.load(Ordering::SeqCst),
            failed = self.shared.failed.load(Ordering::SeqCst),
            "Queue worker stopped"
        );
    }

    /// Execute one alert, logging the outcome. Never propagates failure.
    async fn handle(&self, alert: &Alert) {
        let result = self.process_one(alert).await;
        self.shared.processed.fetch_add(1, Ordering::SeqCst);

        match result {
            Ok(report) => {
                info!(
                    symbol = %report.intent.symbol,
                    side = %report.intent.side,
                    kind = %report.intent.kind,
                    session = %report.session,
                    client_order_id = %report.intent.client_order_id,
                    order_id = %report.ack.id,
                    status = %report.ack.status,
                    "Order submitted"
                );
            }
            Err(e) => {
                self.shared.failed.fetch_add(1, Ordering::SeqCst);
                error!(
                    symbol = %alert.ticker,
                    strategy = %alert.strategy,
                    reason = e.failure_reason(),
                    error_kind = e.broker_error_kind().unwrap_or("none"),
                    error = %e,
                    "Order failed, skipping alert"
                );
            }
        }
    }
}

/// Handle to a spawned [`QueueWorker`].
#[derive(Debug)]
pub struct WorkerHandle {
    join: Option<JoinHandle<()>>,
    shared: Arc<WorkerShared>,
    cancel: CancellationToken,
    /// Does not keep the queue open.
    control: mpsc::WeakUnboundedSender<QueueItem>,
}

impl WorkerHandle {
    pub fn state(&self) -> WorkerState {
        *self.shared.state.read()
    }

    /// Alerts taken off the queue, successful or not.
    pub fn processed(&self) -> u64 {
        self.shared.processed.load(Ordering::SeqCst)
    }

    /// Alerts whose order failed.
    pub fn failed(&self) -> u64 {
        self.shared.failed.load(Ordering::SeqCst)
    }

    /// Graceful stop: enqueue the poison item behind pending alerts and wait
    /// for the worker to drain up to it.
    pub async fn stop(&mut self) -> ExecutorResult<()> {
        if let Some(control) = self.control.upgrade() {
            // A send error means the worker already exited.
            let _ = control.send(QueueItem::Shutdown);
        }
        self.wait().await
    }

    /// Immediate stop: pending alerts are dropped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait for the worker task to finish.
    pub async fn wait(&mut self) -> ExecutorResult<()> {
        match self.join.take() {
            Some(join) => join
                .await
                .map_err(|e| ExecutorError::WorkerJoin(e.to_string())),
            None => Ok(()),
        }
    }
}
